//! The candidate listing returned by `getxml.php`.
//!
//! ```xml
//! <?xml version="1.0" encoding="iso-8859-1" ?>
//! <files count="2">
//!   <cutlist row_index="0">
//!     <id>1234</id>
//!     <rating>4.50</rating>
//!     ...
//!   </cutlist>
//! </files>
//! ```

use encoding_rs::{Encoding, UTF_8};
use gool_common::CandidateHeader;
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Clone, Copy)]
enum Field {
    Id,
    Rating,
}

/// Extract `(id, rating)` pairs in document order.
///
/// Entries without an id are dropped; a missing or non-numeric rating
/// scores 0. A malformed document yields no candidates at all.
pub fn parse_headers(body: &[u8]) -> Vec<CandidateHeader> {
    let text = decode_listing(body);
    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut headers = Vec::new();
    let mut entry: Option<(Option<String>, Option<String>)> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if name.eq_ignore_ascii_case(b"cutlist") {
                    entry = Some((None, None));
                    field = None;
                } else if entry.is_some() && name.eq_ignore_ascii_case(b"id") {
                    field = Some(Field::Id);
                } else if entry.is_some() && name.eq_ignore_ascii_case(b"rating") {
                    field = Some(Field::Rating);
                } else {
                    field = None;
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some((id, rating)), Some(f)) = (entry.as_mut(), field) {
                    let value = match t.unescape() {
                        Ok(v) => v.trim().to_string(),
                        Err(e) => {
                            tracing::warn!("Undecodable cutlist listing: {}", e);
                            return Vec::new();
                        }
                    };
                    match f {
                        Field::Id => *id = Some(value),
                        Field::Rating => *rating = Some(value),
                    }
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if e.local_name().as_ref().eq_ignore_ascii_case(b"cutlist") {
                    if let Some((id, rating)) = entry.take() {
                        push_header(&mut headers, id, rating);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(
                    "Malformed cutlist listing at position {}: {}",
                    reader.buffer_position(),
                    e
                );
                return Vec::new();
            }
            _ => {}
        }
    }

    headers
}

fn push_header(headers: &mut Vec<CandidateHeader>, id: Option<String>, rating: Option<String>) {
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        tracing::debug!("Dropping cutlist entry without id");
        return;
    };
    let score = rating
        .and_then(|r| r.replace(',', ".").parse::<f64>().ok())
        .filter(|s| s.is_finite())
        .unwrap_or(0.0);
    headers.push(CandidateHeader { id, score });
}

/// Sort candidates by descending score. Equal scores keep their listing order.
pub fn rank_headers(mut headers: Vec<CandidateHeader>) -> Vec<CandidateHeader> {
    headers.sort_by(|a, b| b.score.total_cmp(&a.score));
    headers
}

/// Decode the listing using the encoding declared in its XML prolog.
fn decode_listing(body: &[u8]) -> String {
    let encoding = declared_encoding(body).unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!("Cutlist listing is not valid {}", used.name());
    }
    text.into_owned()
}

fn declared_encoding(body: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            Encoding::for_label(&label)
        }
        _ => None,
    }
}
