use super::detail::decode_document;
use super::headers::{parse_headers, rank_headers};
use super::CutlistSource;
use crate::config::CutlistConfig;
use gool_common::{CandidateHeader, Error, Result};
use reqwest::Client;
use std::time::Duration;

/// HTTP client for a cutlist.at compatible server.
pub struct CutlistClient {
    client: Client,
    base_url: String,
}

impl CutlistClient {
    pub fn new(config: &CutlistConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gool/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url(),
        }
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("GET {url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(format!("GET {url}: {e}")))?;
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl CutlistSource for CutlistClient {
    async fn fetch_headers(&self, lookup_name: &str) -> Vec<CandidateHeader> {
        match self.get("getxml.php", &[("name", lookup_name)]).await {
            Ok(body) => {
                let headers = rank_headers(parse_headers(&body));
                tracing::debug!("{} cutlists for {}", headers.len(), lookup_name);
                headers
            }
            Err(e) => {
                tracing::warn!("Cannot list cutlists for {}: {}", lookup_name, e);
                Vec::new()
            }
        }
    }

    async fn fetch_document(&self, id: &str) -> Result<String> {
        let body = self.get("getfile.php", &[("id", id)]).await?;
        Ok(decode_document(&body))
    }
}
