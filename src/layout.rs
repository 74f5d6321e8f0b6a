use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::attr::resolve_element_url;
use crate::cli::Layout;

static LEGACY_IMAGES: LazyLock<Selector> =
    LazyLock::new(|| selector("div.chapter-content img.chapter-img"));
static LEGACY_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("section#chapters h5 a"));
static LEGACY_CURRENT_CHAPTER: LazyLock<Selector> =
    LazyLock::new(|| selector("ul#chap_list li.current a"));
static LEGACY_CHAPTER_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("ul#chap_list li a"));

static CURRENT_IMAGES: LazyLock<Selector> = LazyLock::new(|| selector("div.mb-3 img.img-fluid"));
static CURRENT_HEADING: LazyLock<Selector> =
    LazyLock::new(|| selector("main#reader-basic div.container h1"));
static CURRENT_CHAPTER_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector("div.list-group-item-action a"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid built-in selector {css:?}: {err}"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterMetadata {
    pub title: String,
    pub chapter_label: String,
}

#[derive(Debug, Clone)]
pub struct ChapterPage {
    pub metadata: ChapterMetadata,
    pub pages: Vec<Url>,
    pub rejected: Vec<RejectedImage>,
}

/// An image node whose resolved source was not usable as a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedImage {
    pub index: usize,
    pub candidate: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Unparsable(url::ParseError),
    Scheme(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparsable(err) => write!(f, "{err}"),
            Self::Scheme(scheme) => write!(f, "scheme {scheme:?} is not allowed"),
        }
    }
}

/// Schemes an image URL may use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePolicy {
    pub allow_http: bool,
}

impl ImagePolicy {
    fn check(&self, candidate: &str) -> Result<Url, RejectReason> {
        let url = Url::parse(candidate).map_err(RejectReason::Unparsable)?;
        match url.scheme() {
            "https" => Ok(url),
            "http" if self.allow_http => Ok(url),
            other => Err(RejectReason::Scheme(other.to_owned())),
        }
    }
}

/// Where a resolved chapter list begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStart {
    /// The whole series, oldest first.
    FirstChapter,
    /// The requested chapter and everything after it.
    RequestedChapter,
}

/// The HTML structure a reader site exposes its pages and chapter index with.
pub trait SiteLayout {
    fn name(&self) -> &'static str;

    /// Image nodes carrying page images, in reading order.
    fn page_images(&self) -> &Selector;

    /// Attributes holding an image source, most preferred first. Plain `src` comes
    /// last since lazy-loading readers put ad placeholders there.
    fn image_attrs(&self) -> &'static [&'static str];

    fn chapter_metadata(&self, document: &Html) -> ChapterMetadata;

    /// Anchors of the chapter index, newest chapter first.
    fn chapter_links(&self) -> &Selector;

    fn list_start(&self) -> ListStart;

    fn parse_chapter_page(&self, document: &Html, policy: ImagePolicy) -> ChapterPage {
        let mut pages = Vec::new();
        let mut rejected = Vec::new();

        for (index, img) in document.select(self.page_images()).enumerate() {
            let candidate = resolve_element_url(img, self.image_attrs());
            match policy.check(&candidate) {
                Ok(url) => pages.push(url),
                Err(reason) => rejected.push(RejectedImage {
                    index,
                    candidate,
                    reason,
                }),
            }
        }

        ChapterPage {
            metadata: self.chapter_metadata(document),
            pages,
            rejected,
        }
    }

    /// Raw `href` values of the chapter index in document order.
    fn list_chapter_links(&self, document: &Html) -> Vec<String> {
        document
            .select(self.chapter_links())
            .filter_map(|anchor| {
                let href = anchor.value().attr("href");
                if href.is_none() {
                    tracing::debug!(text = %element_text(anchor), "chapter link without href");
                }
                href.map(str::to_owned)
            })
            .collect()
    }
}

/// Side chapter list with the open chapter marked `current`; the index is the
/// chapter page itself and listing starts at the requested chapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySiteLayout;

impl SiteLayout for LegacySiteLayout {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn page_images(&self) -> &Selector {
        &LEGACY_IMAGES
    }

    fn image_attrs(&self) -> &'static [&'static str] {
        &["data-srcset", "data-aload", "src"]
    }

    fn chapter_metadata(&self, document: &Html) -> ChapterMetadata {
        ChapterMetadata {
            title: last_text(document, &LEGACY_TITLE).unwrap_or_default(),
            chapter_label: last_text(document, &LEGACY_CURRENT_CHAPTER).unwrap_or_default(),
        }
    }

    fn chapter_links(&self) -> &Selector {
        &LEGACY_CHAPTER_LINKS
    }

    fn list_start(&self) -> ListStart {
        ListStart::RequestedChapter
    }
}

/// Reader heading of the form `<chapter> | <title>` and a list-group chapter index.
/// Listing always covers the whole series.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentSiteLayout;

impl SiteLayout for CurrentSiteLayout {
    fn name(&self) -> &'static str {
        "current"
    }

    fn page_images(&self) -> &Selector {
        &CURRENT_IMAGES
    }

    fn image_attrs(&self) -> &'static [&'static str] {
        &["data-srcset", "data-src", "data-aload", "src"]
    }

    fn chapter_metadata(&self, document: &Html) -> ChapterMetadata {
        last_text(document, &CURRENT_HEADING)
            .map(|heading| split_heading(&heading))
            .unwrap_or_default()
    }

    fn chapter_links(&self) -> &Selector {
        &CURRENT_CHAPTER_LINKS
    }

    fn list_start(&self) -> ListStart {
        ListStart::FirstChapter
    }
}

impl Layout {
    pub fn site_layout(self) -> &'static dyn SiteLayout {
        match self {
            Layout::Current => &CurrentSiteLayout,
            Layout::Legacy => &LegacySiteLayout,
        }
    }
}

fn split_heading(heading: &str) -> ChapterMetadata {
    match heading.split_once('|') {
        Some((chapter, title)) => ChapterMetadata {
            title: title.trim().to_owned(),
            chapter_label: chapter.trim().to_owned(),
        },
        // No delimiter: the heading names the series only.
        None => ChapterMetadata {
            title: heading.to_owned(),
            chapter_label: String::new(),
        },
    }
}

fn last_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).last().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}
