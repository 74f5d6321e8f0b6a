use url::Url;

use crate::error::Result;
use crate::http::HttpClient;
use crate::layout::{ChapterPage, ImagePolicy, SiteLayout};

/// Fetches one chapter reader page and extracts its page images and labels.
///
/// Image nodes whose source is unusable are skipped with a warning each; later
/// pages close ranks, so numbering stays contiguous.
pub fn parse_chapter(
    client: &HttpClient,
    layout: &dyn SiteLayout,
    chapter_url: &Url,
    policy: ImagePolicy,
) -> Result<ChapterPage> {
    let document = client.get_html(chapter_url)?;
    let page = layout.parse_chapter_page(&document, policy);

    for rejected in &page.rejected {
        tracing::warn!(
            chapter = %chapter_url,
            index = rejected.index,
            candidate = %rejected.candidate,
            reason = %rejected.reason,
            "skip page image"
        );
    }

    Ok(page)
}
