//! Article download with escalating fallbacks.
//!
//! [`FetchChain::fetch`] walks an ordered list of [`FetchMethod`]s and returns
//! the first HTML body obtained:
//!
//! 1. [`direct::DirectDownload`]: plain browser user agent, 10 s
//! 2. [`headers::HeaderFetch`]: full browser header set with a search-engine
//!    referer, 10 s, status must be 200
//! 3. [`impersonate::Impersonate`]: Chrome 124 TLS and HTTP/2 emulation, 15 s,
//!    status must be 200
//!
//! Whatever a method fails with (bad status, transport error, timeout), the
//! next method runs. When all of them fail the caller gets a [`FetchFailed`]
//! naming the first and last reasons.

pub mod direct;
pub mod headers;
pub mod impersonate;

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchFailed};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, instrument, warn};
use url::Url;

use direct::DirectDownload;
use headers::HeaderFetch;
use impersonate::Impersonate;

/// One way of obtaining a page's HTML.
#[async_trait]
pub trait FetchMethod: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    async fn try_fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// HTML plus the method that produced it.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub html: String,
    pub method: &'static str,
}

pub struct FetchChain {
    methods: Vec<Box<dyn FetchMethod>>,
}

impl FetchChain {
    pub fn new(methods: Vec<Box<dyn FetchMethod>>) -> Self {
        Self { methods }
    }

    /// The standard direct → headers → impersonate chain.
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(vec![
            Box::new(DirectDownload::new(config)?),
            Box::new(HeaderFetch::new(config)?),
            Box::new(Impersonate::new(config)?),
        ]))
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &Url) -> Result<Fetched, FetchFailed> {
        let mut original: Option<String> = None;
        let mut last: Option<(&'static str, String)> = None;

        for method in &self.methods {
            let name = method.name();
            let t0 = Instant::now();
            match method.try_fetch(url).await {
                Ok(html) => {
                    info!(
                        method = name,
                        bytes = html.len(),
                        elapsed_ms = t0.elapsed().as_millis(),
                        "Fetched article HTML"
                    );
                    return Ok(Fetched { html, method: name });
                }
                Err(e) => {
                    warn!(method = name, error = %e, "Fetch method failed; trying next");
                    if original.is_none() {
                        original = Some(format!("{name}: {e}"));
                    }
                    last = Some((name, e.to_string()));
                }
            }
        }

        let (last_method, last) =
            last.unwrap_or(("none", "no fetch methods configured".to_string()));
        Err(FetchFailed {
            original: original.unwrap_or_else(|| last.clone()),
            last_method,
            last,
            attempts: self.methods.len(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    /// Scripted method that records the order it was called in.
    pub struct StubMethod {
        pub name: &'static str,
        pub html: Option<String>,
        pub status: StatusCode,
        pub log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl StubMethod {
        pub fn ok(name: &'static str, html: &str, log: &Arc<Mutex<Vec<&'static str>>>) -> Self {
            Self {
                name,
                html: Some(html.to_string()),
                status: StatusCode::OK,
                log: Arc::clone(log),
            }
        }

        pub fn failing(
            name: &'static str,
            status: StatusCode,
            log: &Arc<Mutex<Vec<&'static str>>>,
        ) -> Self {
            Self {
                name,
                html: None,
                status,
                log: Arc::clone(log),
            }
        }
    }

    #[async_trait]
    impl FetchMethod for StubMethod {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn try_fetch(&self, _url: &Url) -> Result<String, FetchError> {
            self.log.lock().unwrap().push(self.name);
            self.html.clone().ok_or(FetchError::Status(self.status))
        }
    }
}
