use std::fmt;
use std::path::{Path, PathBuf};

use crate::pocket_api::params::RetrieveParams;

/// The two secrets every request carries, as stored in the credentials file.
///
/// The file must contain exactly `consumer_key` and `access_token`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub consumer_key: String,
    pub access_token: String,
}

impl Credentials {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CredentialsError::FileError {
                file_path: path.to_path_buf(),
                io_error: e,
            })?;
        let credentials = Self::parse(&content).map_err(|e| CredentialsError::ParseError {
            file_path: path.to_path_buf(),
            json_error: e,
        })?;
        log::debug!("Loaded credentials from '{}'", path.display());
        Ok(credentials)
    }

    fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl From<Credentials> for RetrieveParams {
    fn from(credentials: Credentials) -> Self {
        RetrieveParams::new(credentials.consumer_key, credentials.access_token)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CredentialsError {
    #[error("Error reading credentials file '{}'", file_path.display())]
    FileError {
        file_path: PathBuf,
        #[source]
        io_error: std::io::Error,
    },
    #[error("Invalid credentials in file '{}'", file_path.display())]
    ParseError {
        file_path: PathBuf,
        #[source]
        json_error: serde_json::Error,
    },
}
