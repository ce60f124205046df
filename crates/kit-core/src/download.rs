//! Remote content for additional-config entries

use std::time::Duration;

use reqwest::blocking::Client;

use crate::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("kit-package-manager/", env!("CARGO_PKG_VERSION"));

/// Fetches the text behind a URL.
pub trait Downloader {
    fn download(&self, url: &str) -> Result<String>;
}

/// [`Downloader`] over blocking HTTP with a 30 second timeout and no retries.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Download {
                url: String::new(),
                message: format!("could not build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str) -> Result<String> {
        let url = raw_content_url(url);
        let failed = |message: String| Error::Download {
            url: url.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("status {}", response.status())));
        }
        response.text().map_err(|e| failed(e.to_string()))
    }
}

/// Rewrite a GitHub file page URL to its raw content URL.
///
/// `https://github.com/o/r/blob/main/f` becomes
/// `https://raw.githubusercontent.com/o/r/main/f`. Other URLs pass through.
pub fn raw_content_url(url: &str) -> String {
    let Some(rest) = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
    else {
        return url.to_string();
    };
    format!(
        "https://raw.githubusercontent.com/{}",
        rest.replacen("/blob/", "/", 1)
    )
}
