//! HTTP access to the quote backend's `/api/v1` surface.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ListedQuote, Quote},
    error::{TransportError, GENERATE_FAILED_MESSAGE},
    protocol::{
        ErrorBody, GenerateQuoteRequest, GeneratedQuote, QuotesQuery, QuotesResponse,
        TagsResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

const API_PREFIX: &str = "api/v1";
const LIST_FAILED_MESSAGE: &str = "Failed to load quotes";
const TAGS_FAILED_MESSAGE: &str = "Failed to load tags";

#[async_trait]
pub trait QuoteApi: Send + Sync {
    async fn fetch_tags(&self) -> Result<Vec<String>, TransportError>;
    async fn list_quotes(
        &self,
        tag: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ListedQuote>, TransportError>;
    async fn generate_quote(&self, request: &GenerateQuoteRequest)
        -> Result<Quote, TransportError>;
}

pub struct HttpQuoteApi {
    http: Client,
    api_base: String,
}

impl HttpQuoteApi {
    /// `base_url` is the server root; `/api/v1` is appended unless already
    /// present. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let parsed =
            Url::parse(base_url.trim()).with_context(|| format!("invalid api url '{base_url}'"))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            bail!("api url must be an http(s) url: '{base_url}'");
        }

        let root = parsed.as_str().trim_end_matches('/');
        let api_base = if root.ends_with(API_PREFIX) {
            root.to_string()
        } else {
            format!("{root}/{API_PREFIX}")
        };

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self { http, api_base })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }
}

#[async_trait]
impl QuoteApi for HttpQuoteApi {
    async fn fetch_tags(&self) -> Result<Vec<String>, TransportError> {
        let res = self
            .http
            .get(self.endpoint("tags"))
            .send()
            .await
            .map_err(map_send_error)?;
        let body: TagsResponse = read_json(res, TAGS_FAILED_MESSAGE).await?;
        debug!(count = body.tags.len(), "api: tags fetched");
        Ok(body.tags)
    }

    async fn list_quotes(
        &self,
        tag: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ListedQuote>, TransportError> {
        let res = self
            .http
            .get(self.endpoint("quotes"))
            .query(&QuotesQuery {
                tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
                limit,
            })
            .send()
            .await
            .map_err(map_send_error)?;
        let body: QuotesResponse = read_json(res, LIST_FAILED_MESSAGE).await?;
        Ok(body.quotes)
    }

    async fn generate_quote(
        &self,
        request: &GenerateQuoteRequest,
    ) -> Result<Quote, TransportError> {
        let res = self
            .http
            .post(self.endpoint("quote"))
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;
        let body: GeneratedQuote = read_json(res, GENERATE_FAILED_MESSAGE).await?;
        body.into_quote(&request.tag)
    }
}

/// Decodes a 2xx body, or turns a non-2xx into a [`TransportError`] carrying
/// the server's `{message}` when one is present.
async fn read_json<T: DeserializeOwned>(
    res: Response,
    fallback_message: &str,
) -> Result<T, TransportError> {
    let status = res.status();
    if !status.is_success() {
        let raw = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback_message.to_string());
        warn!(status = status.as_u16(), %message, "api: request rejected");
        return Err(TransportError::http(status.as_u16(), message));
    }

    res.json::<T>().await.map_err(|err| {
        warn!(error = %err, "api: malformed response body");
        TransportError::new(format!("malformed response: {err}"))
    })
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    warn!(error = %err, timeout = err.is_timeout(), "api: request failed");
    if err.is_timeout() {
        TransportError::new("Request timed out. Please try again.")
    } else {
        TransportError::new("Server unreachable. Please try again.")
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
