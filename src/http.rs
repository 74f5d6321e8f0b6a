use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::REFERER;
use scraper::Html;
use url::Url;

use crate::error::{Result, RipError};

/// Blocking client shared by every stage of a run. Only `200 OK` counts as success.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RipError::Client)?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &Url) -> Result<Response> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| RipError::Transport {
                url: url.to_string(),
                source,
            })?;
        ensure_ok(url, response)
    }

    pub fn get_with_referer(&self, url: &Url, referer: &str) -> Result<Response> {
        tracing::debug!(%url, referer, "GET");
        let response = self
            .client
            .get(url.clone())
            .header(REFERER, referer)
            .send()
            .map_err(|source| RipError::Transport {
                url: url.to_string(),
                source,
            })?;
        ensure_ok(url, response)
    }

    pub fn get_html(&self, url: &Url) -> Result<Html> {
        let body = self
            .get(url)?
            .text()
            .map_err(|source| RipError::HtmlParse {
                url: url.to_string(),
                source,
            })?;
        Ok(Html::parse_document(&body))
    }
}

fn ensure_ok(url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(RipError::UnexpectedStatus {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}
