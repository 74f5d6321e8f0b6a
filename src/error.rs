use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = RipError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RipError {
    #[error("build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("GET {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url}: unexpected status {status}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("read html document from {url}: {source}")]
    HtmlParse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("parse url {input:?}: {source}")]
    UrlParse {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("GET {url}: response has no content length")]
    UnknownLength { url: String },

    #[error("start chapter {start} not found in chapter list ({listed} chapters)")]
    StartChapterNotFound { start: String, listed: usize },

    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write archive entry {entry}: {source}")]
    ArchiveFormat {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive entry {entry}: declared {declared} bytes but {problem}")]
    SizeMismatch {
        entry: String,
        declared: u64,
        problem: SizeProblem,
    },
}

impl RipError {
    pub fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SizeProblem {
    #[error("stream ended after {0} bytes")]
    Short(u64),
    #[error("stream has trailing bytes")]
    Long,
}
