//! First fetch method: a plain download with a desktop user agent.

use super::FetchMethod;
use crate::config::FetchConfig;
use crate::error::{DownloadState, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

pub struct DirectDownload {
    client: Client,
}

impl DirectDownload {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchMethod for DirectDownload {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn try_fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let state = if status.is_success() {
            DownloadState::Success
        } else {
            DownloadState::FailedResponse(status.as_u16().to_string())
        };
        debug!(%url, %state, "Direct download finished");

        if state != DownloadState::Success {
            return Err(FetchError::Download(state));
        }
        Ok(response.text().await?)
    }
}
