//! Last-resort fetch method: present as desktop Chrome 124.
//!
//! Built on `wreq`, which drives BoringSSL to reproduce Chrome's TLS
//! ClientHello (cipher and extension order, GREASE, ALPS) and its HTTP/2
//! SETTINGS and pseudo-header order, so JA3/JA4 and Akamai-style HTTP/2
//! fingerprints match a real browser build. The emulation profile also
//! supplies Chrome's user agent, client hints and header order. A cookie jar
//! lets interstitials that set a cookie and redirect complete.

use super::FetchMethod;
use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;
use wreq::Client;
use wreq_util::Emulation;

/// Browser build whose TLS and HTTP/2 fingerprint is reproduced.
const PROFILE: Emulation = Emulation::Chrome124;

pub struct Impersonate {
    client: Client,
}

impl Impersonate {
    pub fn new(config: &FetchConfig) -> Result<Self, wreq::Error> {
        let client = Client::builder()
            .emulation(PROFILE)
            .cookie_store(true)
            .timeout(config.impersonate_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchMethod for Impersonate {
    fn name(&self) -> &'static str {
        "impersonate"
    }

    async fn try_fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_builds_with_chrome_profile() {
        assert!(matches!(PROFILE, Emulation::Chrome124));
        let method = Impersonate::new(&FetchConfig::default()).unwrap();
        assert_eq!(method.name(), "impersonate");
    }

    #[test]
    fn test_impersonate_timeout_is_longer() {
        let config = FetchConfig::default();
        assert_eq!(config.impersonate_timeout(), Duration::from_secs(15));
        assert!(config.impersonate_timeout() > config.timeout());
    }
}
