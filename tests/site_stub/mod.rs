use std::collections::HashMap;
use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const SERIES_TITLE: &str = "Star Sailor";
const PAGES_PER_CHAPTER: usize = 3;
const AD_PLACEHOLDER: &str = "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///ywAAAAAAQABAAACAUwAOw==";

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubLayout {
    Current,
    Legacy,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Status(u16),
    UnknownLength,
}

#[derive(Debug, Clone)]
pub struct SiteStubConfig {
    pub layout: StubLayout,
    pub chapters: usize,
    /// Faults keyed by request path, e.g. `/img/2/1.jpg`.
    pub faults: HashMap<String, Fault>,
}

impl SiteStubConfig {
    pub fn new(layout: StubLayout, chapters: usize) -> Self {
        Self {
            layout,
            chapters,
            faults: HashMap::new(),
        }
    }

    #[allow(dead_code)]
    pub fn with_fault(mut self, path: &str, fault: Fault) -> Self {
        self.faults.insert(path.to_owned(), fault);
        self
    }
}

pub struct SiteStub {
    pub base_url: String,
    layout: StubLayout,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SiteStub {
    pub fn spawn(config: SiteStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start site stub server");
        let base_url = format!("http://{}", server.server_addr());
        let layout = config.layout;

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let site_base = base_url.clone();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_owned();
                let path = url.split('?').next().unwrap_or(&url).to_owned();
                let referer = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Referer"))
                    .map(|header| header.value.as_str().to_owned());

                if let Some(fault) = config.faults.get(&path) {
                    let _ = match *fault {
                        Fault::Status(status) => request.respond(
                            tiny_http::Response::from_string("fault").with_status_code(status),
                        ),
                        Fault::UnknownLength => request.respond(
                            tiny_http::Response::new(
                                tiny_http::StatusCode(200),
                                Vec::new(),
                                Cursor::new(b"no length here".to_vec()),
                                None,
                                None,
                            )
                            .with_chunked_threshold(0),
                        ),
                    };
                    continue;
                }

                if let Some(chapter) = chapter_number(config.layout, &path, config.chapters) {
                    let html = chapter_html(config.layout, &site_base, chapter, config.chapters);
                    let header = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"text/html; charset=utf-8"[..],
                    )
                    .expect("build header");
                    let _ = request.respond(tiny_http::Response::from_string(html).with_header(header));
                    continue;
                }

                if let Some((chapter, page)) = image_number(&path) {
                    let expected = format!("{site_base}{}", chapter_path(config.layout, chapter));
                    if referer.as_deref() != Some(expected.as_str()) {
                        let _ = request.respond(
                            tiny_http::Response::from_string("hotlinking denied")
                                .with_status_code(403),
                        );
                        continue;
                    }
                    let _ = request.respond(tiny_http::Response::from_data(page_bytes(chapter, page)));
                    continue;
                }

                let _ = request
                    .respond(tiny_http::Response::from_string("not found").with_status_code(404));
            }
        });

        Self {
            base_url,
            layout,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn chapter_url(&self, chapter: usize) -> String {
        format!("{}{}", self.base_url, chapter_path(self.layout, chapter))
    }
}

impl Drop for SiteStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn page_bytes(chapter: usize, page: usize) -> Vec<u8> {
    format!("jpeg bytes of chapter {chapter} page {page}").into_bytes()
}

pub fn chapter_label(layout: StubLayout, chapter: usize) -> String {
    match layout {
        StubLayout::Current => format!("Chapter {chapter}"),
        StubLayout::Legacy => format!("Ch. {chapter}"),
    }
}

pub fn pages_per_chapter() -> usize {
    PAGES_PER_CHAPTER
}

fn chapter_path(layout: StubLayout, chapter: usize) -> String {
    match layout {
        StubLayout::Current => format!("/read/star-sailor/{chapter}"),
        StubLayout::Legacy => format!("/series/star-sailor/ch-{chapter}"),
    }
}

fn chapter_number(layout: StubLayout, path: &str, chapters: usize) -> Option<usize> {
    (1..=chapters).find(|chapter| chapter_path(layout, *chapter) == path)
}

fn image_number(path: &str) -> Option<(usize, usize)> {
    let rest = path.strip_prefix("/img/")?.strip_suffix(".jpg")?;
    let (chapter, page) = rest.split_once('/')?;
    Some((chapter.parse().ok()?, page.parse().ok()?))
}

fn chapter_html(layout: StubLayout, base: &str, chapter: usize, chapters: usize) -> String {
    // The ad placeholder sits between the first and second page.
    let mut images = Vec::new();
    for page in 0..PAGES_PER_CHAPTER {
        let src = format!("{base}/img/{chapter}/{page}.jpg");
        images.push(match layout {
            StubLayout::Current => format!(
                r#"<img class="img-fluid" data-src="{src}" src="{AD_PLACEHOLDER}">"#
            ),
            StubLayout::Legacy => {
                format!(r#"<img class="chapter-img" data-srcset=" {src} " src="{AD_PLACEHOLDER}">"#)
            }
        });
        if page == 0 {
            images.push(match layout {
                StubLayout::Current => format!(r#"<img class="img-fluid" src="{AD_PLACEHOLDER}">"#),
                StubLayout::Legacy => format!(r#"<img class="chapter-img" src="{AD_PLACEHOLDER}">"#),
            });
        }
    }
    let images = images.join("\n      ");

    let label = chapter_label(layout, chapter);
    let newest_first = (1..=chapters).rev();

    match layout {
        StubLayout::Current => {
            let links = newest_first
                .map(|n| {
                    format!(
                        r#"<div class="list-group-item-action"><a href="{}">Chapter {n}</a></div>"#,
                        chapter_path(layout, n)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n    ");
            format!(
                r#"<!doctype html>
<html>
  <head><title>{SERIES_TITLE}</title></head>
  <body>
    <main id="reader-basic">
      <div class="container"><h1>{label} | {SERIES_TITLE}</h1></div>
      <div class="mb-3">
      {images}
      </div>
    </main>
    <div class="list-group">
    {links}
    </div>
  </body>
</html>
"#
            )
        }
        StubLayout::Legacy => {
            let links = newest_first
                .map(|n| {
                    let class = if n == chapter { r#" class="current""# } else { "" };
                    format!(
                        r#"<li{class}><a href="{}">{}</a></li>"#,
                        chapter_path(layout, n),
                        chapter_label(layout, n)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n      ");
            format!(
                r#"<!doctype html>
<html>
  <head><title>{SERIES_TITLE}</title></head>
  <body>
    <section id="chapters"><h5><a href="/series/star-sailor">{SERIES_TITLE}</a></h5></section>
    <ul id="chap_list">
      {links}
    </ul>
    <div class="chapter-content">
      {images}
    </div>
  </body>
</html>
"#
            )
        }
    }
}
