use std::io::Read;

use url::Url;

use crate::error::{Result, RipError};
use crate::http::HttpClient;

/// An open page body and the length its server declared for it.
///
/// The body is released when the value is dropped, so pages abandoned by an
/// aborted run are closed along with the `Vec` holding them.
pub struct DownloadedPage {
    body: Box<dyn Read + Send>,
    size: u64,
}

impl DownloadedPage {
    pub fn new(body: impl Read + Send + 'static, size: u64) -> Self {
        Self {
            body: Box::new(body),
            size,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn into_body(self) -> Box<dyn Read + Send> {
        self.body
    }
}

impl std::fmt::Debug for DownloadedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadedPage")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Requests every page in order with `referer` set, keeping the bodies open.
pub fn fetch_pages(
    client: &HttpClient,
    pages: &[Url],
    referer: &str,
) -> Result<Vec<DownloadedPage>> {
    let mut downloaded = Vec::with_capacity(pages.len());
    for page in pages {
        let response = client.get_with_referer(page, referer)?;
        let Some(size) = response.content_length() else {
            return Err(RipError::UnknownLength {
                url: page.to_string(),
            });
        };
        tracing::debug!(url = %page, size, "page response");
        downloaded.push(DownloadedPage::new(response, size));
    }
    Ok(downloaded)
}
