//! otrdecoder invocation.

use crate::command::ToolCommand;
use crate::progress::ProgressFormat;
use std::fmt;
use std::path::Path;

/// OTR account credentials passed to the decoder.
#[derive(Clone, Default)]
pub struct DecoderCredentials {
    pub username: String,
    pub password: String,
}

impl DecoderCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for DecoderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Build the command decoding `input` into `output_dir`.
pub fn decode_command(
    decoder: &Path,
    credentials: &DecoderCredentials,
    input: &Path,
    output_dir: &Path,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(decoder);
    cmd.arg("-e")
        .arg(credentials.username.as_str())
        .arg("-p")
        .arg(credentials.password.as_str())
        .arg("-i")
        .path_arg(input)
        .arg("-o")
        .path_arg(output_dir)
        .progress(ProgressFormat::Decoder);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_command_arguments() {
        let creds = DecoderCredentials::new("me@example.org", "hunter2");
        let cmd = decode_command(
            Path::new("/usr/bin/otrdecoder"),
            &creds,
            Path::new("/videos/Encoded/a.avi.otrkey"),
            Path::new("/videos/Decoded"),
        );

        assert_eq!(cmd.program_name(), "otrdecoder");
        assert_eq!(
            cmd.get_args(),
            [
                "-e",
                "me@example.org",
                "-p",
                "hunter2",
                "-i",
                "/videos/Encoded/a.avi.otrkey",
                "-o",
                "/videos/Decoded"
            ]
        );
        assert_eq!(cmd.progress_format(), ProgressFormat::Decoder);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = DecoderCredentials::new("me", "hunter2");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("me"));
        assert!(!dbg.contains("hunter2"));
        assert!(creds.is_complete());
        assert!(!DecoderCredentials::default().is_complete());
    }
}
