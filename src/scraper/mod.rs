pub mod catalog;
pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

pub use self::catalog::SeasonCatalog;
pub use self::http_client::HttpFetcher;

// ── Fetcher trait ─────────────────────────────────────────────────────────────

/// A loaded page plus the inner HTML of the element that was waited for.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub element_html: String,
}

/// Swappable page-loading session. Implementations pace their own requests.
#[async_trait]
pub trait PageFetcher: Send {
    async fn fetch_page(&mut self, url: &str) -> Result<String, FetchError>;

    /// Load `url` and wait up to `wait` for the element with `element_id`.
    async fn fetch_with_element(
        &mut self,
        url: &str,
        element_id: &str,
        wait: Duration,
    ) -> Result<RenderedPage, FetchError>;

    /// Release the session. Further fetches fail.
    async fn close(&mut self) {}
}

// ── Scripted fetcher for tests ────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::error::FetchCause;
    use crate::scraper::http_client::element_inner_html;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Serves canned pages; unknown URLs answer 404. Shares its request log
    /// so tests can inspect it after the fetcher is moved into a driver.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        pages: HashMap<String, String>,
        on_request: Option<Box<dyn FnMut(&str) + Send>>,
        pub requests: Arc<Mutex<Vec<String>>>,
        pub closed: Arc<Mutex<bool>>,
    }

    impl ScriptedFetcher {
        pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }

        /// Run `hook` with each requested URL before it is answered.
        pub fn on_request(mut self, hook: impl FnMut(&str) + Send + 'static) -> Self {
            self.on_request = Some(Box::new(hook));
            self
        }

        fn serve(&mut self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some(hook) = self.on_request.as_mut() {
                hook(url);
            }
            if *self.closed.lock().unwrap() {
                return Err(FetchError::new(url, FetchCause::Network("session closed".into())));
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::new(url, FetchCause::Status(404)))
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&mut self, url: &str) -> Result<String, FetchError> {
            self.serve(url)
        }

        async fn fetch_with_element(
            &mut self,
            url: &str,
            element_id: &str,
            _wait: Duration,
        ) -> Result<RenderedPage, FetchError> {
            let html = self.serve(url)?;
            let element_html = element_inner_html(&html, element_id)
                .ok_or_else(|| FetchError::new(url, FetchCause::ElementMissing(element_id.to_string())))?;
            Ok(RenderedPage { html, element_html })
        }

        async fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }
}
