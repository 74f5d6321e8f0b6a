use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::archive::{archive_path, write_archive};
use crate::chapter::parse_chapter;
use crate::chapters::list_chapters_from;
use crate::cli::Cli;
use crate::error::Result;
use crate::fetch::fetch_pages;
use crate::http::HttpClient;
use crate::layout::{ImagePolicy, SiteLayout};

#[derive(Debug, Default)]
pub struct RunSummary {
    pub archives: Vec<PathBuf>,
    pub pages: usize,
}

/// Rips chapters one at a time: parse, fetch every page, then write the archive.
pub struct Ripper {
    client: HttpClient,
    layout: &'static dyn SiteLayout,
    policy: ImagePolicy,
    out_dir: PathBuf,
}

impl Ripper {
    pub fn new(
        client: HttpClient,
        layout: &'static dyn SiteLayout,
        policy: ImagePolicy,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            layout,
            policy,
            out_dir: out_dir.into(),
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let client = HttpClient::new(cli.timeout_secs.map(Duration::from_secs))?;
        Ok(Self::new(
            client,
            cli.layout.site_layout(),
            ImagePolicy {
                allow_http: cli.allow_http,
            },
            &cli.out,
        ))
    }

    pub fn run(&self, start: &str) -> Result<RunSummary> {
        let chapters = list_chapters_from(&self.client, self.layout, start)?;

        let mut summary = RunSummary::default();
        for chapter_url in &chapters {
            let (archive, pages) = self.rip_chapter(chapter_url)?;
            summary.archives.push(archive);
            summary.pages += pages;
        }
        Ok(summary)
    }

    /// Returns the written archive and its page count.
    pub fn rip_chapter(&self, chapter_url: &Url) -> Result<(PathBuf, usize)> {
        let chapter = parse_chapter(&self.client, self.layout, chapter_url, self.policy)?;
        let title = &chapter.metadata.title;
        let chapter_label = &chapter.metadata.chapter_label;
        tracing::info!(
            title = %title,
            chapter = %chapter_label,
            pages = chapter.pages.len(),
            skipped = chapter.rejected.len(),
            "parsed chapter"
        );

        let pages = fetch_pages(&self.client, &chapter.pages, chapter_url.as_str())?;
        let page_count = pages.len();

        let path = archive_path(&self.out_dir, title, chapter_label);
        write_archive(&path, title, chapter_label, pages)?;
        tracing::info!(path = %path.display(), pages = page_count, "wrote archive");

        Ok((path, page_count))
    }
}
