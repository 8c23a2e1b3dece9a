use std::time::Duration;

use log::debug;
use salat_engine::{EngineError, SourceFetcher};

/// Some schedule hosts serve a bot page to unknown agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Fetches the schedule page over HTTP(S) with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    user_agent: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }

    fn unavailable(&self, err: reqwest::Error, timeout: Duration) -> EngineError {
        if err.is_timeout() {
            EngineError::SourceUnavailable(format!(
                "timed out after {}s fetching {}",
                timeout.as_secs(),
                self.url
            ))
        } else if let Some(status) = err.status() {
            EngineError::SourceUnavailable(format!("HTTP {status} from {}", self.url))
        } else {
            EngineError::SourceUnavailable(format!("{} ({err})", self.url))
        }
    }
}

impl SourceFetcher for HttpSource {
    fn fetch(&self, timeout: Duration) -> Result<String, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| self.unavailable(e, timeout))?;

        let resp = client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.unavailable(e, timeout))?;
        debug!("{} answered {}", self.url, resp.status());

        resp.text().map_err(|e| self.unavailable(e, timeout))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
