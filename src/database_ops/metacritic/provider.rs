use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::normalization::Platform;
use crate::util::env;

use super::cache::PageCache;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

/// Rate-limited page fetcher for the review site.
///
/// Every page goes through a [`PageCache`] first; only misses sleep for the
/// configured delay and hit the network.
#[derive(Debug, Clone)]
pub struct MetacriticClient {
    base_url: Url,
    http: Client,
    delay: Duration,
}

impl MetacriticClient {
    pub fn new(base_url: &str, delay: Duration, timeout_secs: Option<u64>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid base url {base_url:?}"))?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(30)))
            .build()?;
        Ok(Self {
            base_url,
            http,
            delay,
        })
    }

    /// Built from `MC_BASE_URL`, `SCRAPE_DELAY_MS` and `SCRAPE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::new(&env::base_url(), env::scrape_delay(), env::scrape_timeout_secs())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// First page of the release-date listing sorted by critic score.
    pub fn listing_url(&self, platform: Platform) -> Result<String> {
        let path = format!(
            "/browse/games/release-date/available/{}/metascore",
            platform.code()
        );
        self.absolute(&path)
    }

    /// Resolve a site-relative link.
    pub fn absolute(&self, href: &str) -> Result<String> {
        self.base_url
            .join(href)
            .map(String::from)
            .with_context(|| format!("cannot resolve link {href:?}"))
    }

    pub async fn fetch<C: PageCache + ?Sized>(&self, url: &str, cache: &mut C) -> Result<String> {
        if let Some(body) = cache.get(url) {
            debug!(url, "page cache hit");
            return Ok(body.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(url, "fetching page");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 500);
            return Err(anyhow!("page fetch failed: {status} url={url} body={body}"));
        }
        let body = resp.text().await?;
        cache.put(url, body.clone());
        Ok(body)
    }
}
