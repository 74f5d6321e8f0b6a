use url::Url;

use crate::error::{Result, RipError};
use crate::http::HttpClient;
use crate::layout::{ListStart, SiteLayout};

/// Resolves the chapters to rip, oldest first, from the page at `start`.
pub fn list_chapters_from(
    client: &HttpClient,
    layout: &dyn SiteLayout,
    start: &str,
) -> Result<Vec<Url>> {
    let start_url = parse_url(start)?;
    let document = client.get_html(&start_url)?;

    let root = site_root(&start_url);
    let newest_first = layout
        .list_chapter_links(&document)
        .iter()
        .map(|href| {
            root.join(href).map_err(|source| RipError::UrlParse {
                input: href.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let listed = newest_first.len();

    let chronological = oldest_first(newest_first);
    let chapters = match layout.list_start() {
        ListStart::FirstChapter => chronological,
        ListStart::RequestedChapter => starting_at(chronological, &start_url)?,
    };

    tracing::info!(
        layout = layout.name(),
        listed,
        selected = chapters.len(),
        "resolved chapter list"
    );
    Ok(chapters)
}

pub fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|source| RipError::UrlParse {
        input: input.to_owned(),
        source,
    })
}

/// The start URL with path, query and fragment cleared.
pub fn site_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("");
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// Chapter indexes list the newest chapter first; downloads run oldest first.
pub fn oldest_first(mut newest_first: Vec<Url>) -> Vec<Url> {
    newest_first.reverse();
    newest_first
}

/// Drops every chapter before `start`. Fails when `start` is not listed.
pub fn starting_at(chapters: Vec<Url>, start: &Url) -> Result<Vec<Url>> {
    let Some(position) = chapters.iter().position(|chapter| chapter == start) else {
        return Err(RipError::StartChapterNotFound {
            start: start.to_string(),
            listed: chapters.len(),
        });
    };
    Ok(chapters.into_iter().skip(position).collect())
}
