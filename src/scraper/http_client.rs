use crate::config::FetchSettings;
use crate::error::{FetchCause, FetchError};
use crate::scraper::{PageFetcher, RenderedPage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Polite HTTP session: one request at a time with a randomized gap.
pub struct HttpFetcher {
    inner: Option<reqwest::Client>,
    settings: FetchSettings,
    fetched_any: bool,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.page_load_timeout)
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner: Some(inner),
            settings,
            fetched_any: false,
        })
    }

    /// Sleep a random duration within the configured window, skipping the first request.
    async fn polite_delay(&mut self) {
        if !self.fetched_any {
            self.fetched_any = true;
            return;
        }
        let min = self.settings.delay_min.as_millis() as u64;
        let max = self.settings.delay_max.as_millis() as u64;
        let pause = Duration::from_millis(rand::thread_rng().gen_range(min..=max));
        debug!("Polite delay {:?}", pause);
        sleep(pause).await;
    }

    /// One bounded GET. Every failure mode collapses into a `FetchError` for `url`.
    async fn get_text(&self, url: &str, limit: Duration) -> Result<String, FetchError> {
        let client = self
            .inner
            .as_ref()
            .ok_or_else(|| FetchError::new(url, FetchCause::Network("session closed".into())))?;

        debug!("GET {}", url);
        match timeout(limit, load(client, url)).await {
            Err(_) => Err(FetchError::new(url, FetchCause::Timeout(limit))),
            Ok(Err(e)) if e.is_timeout() => Err(FetchError::new(url, FetchCause::Timeout(limit))),
            Ok(Err(e)) => Err(FetchError::new(url, FetchCause::Network(e.to_string()))),
            Ok(Ok(Err(code))) => Err(FetchError::new(url, FetchCause::Status(code))),
            Ok(Ok(Ok(body))) => Ok(body),
        }
    }
}

/// Body on success, status code on a non-2xx answer.
async fn load(client: &reqwest::Client, url: &str) -> Result<Result<String, u16>, reqwest::Error> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Ok(Err(status.as_u16()));
    }
    Ok(Ok(resp.text().await?))
}

/// Inner HTML of the element with `id`, if present.
pub fn element_inner_html(html: &str, id: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(&format!("[id='{}']", id)).ok()?;
    doc.select(&sel).next().map(|el| el.inner_html())
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&mut self, url: &str) -> Result<String, FetchError> {
        self.polite_delay().await;
        let limit = self.settings.page_load_timeout;
        self.get_text(url, limit).await
    }

    async fn fetch_with_element(
        &mut self,
        url: &str,
        element_id: &str,
        wait: Duration,
    ) -> Result<RenderedPage, FetchError> {
        self.polite_delay().await;
        // Static markup: the element arrives with the document or not at all,
        // so the wait bounds the request itself.
        let limit = wait.min(self.settings.page_load_timeout);
        let html = self.get_text(url, limit).await?;

        let element_html = element_inner_html(&html, element_id)
            .ok_or_else(|| FetchError::new(url, FetchCause::ElementMissing(element_id.to_string())))?;

        Ok(RenderedPage { html, element_html })
    }

    async fn close(&mut self) {
        if self.inner.take().is_some() {
            debug!("HTTP session closed");
        }
    }
}
