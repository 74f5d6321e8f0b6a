use std::fs;
use std::io::{self, BufWriter, Read, Write as _};
use std::path::{Path, PathBuf};

use crate::error::{Result, RipError, SizeProblem};
use crate::fetch::DownloadedPage;

pub const ARCHIVE_EXTENSION: &str = "cbt";
pub const ENTRY_MODE: u32 = 0o644;
/// Mode of the finished `.cbt` file.
pub const ARCHIVE_FILE_MODE: u32 = 0o644;

/// `<out>/<title>/<title> <chapter>.cbt`
pub fn archive_path(out_dir: &Path, title: &str, chapter_label: &str) -> PathBuf {
    let title = path_component(title);
    let file_name = format!(
        "{title} {}.{ARCHIVE_EXTENSION}",
        path_component(chapter_label)
    );
    out_dir.join(&title).join(file_name)
}

/// `<title> <chapter>/NNN.jpg`, numbered from zero.
pub fn entry_name(title: &str, chapter_label: &str, index: usize) -> String {
    format!(
        "{} {}/{index:03}.jpg",
        path_component(title),
        path_component(chapter_label)
    )
}

fn path_component(label: &str) -> String {
    match label {
        "." | ".." => "_".to_owned(),
        _ => label.replace(['/', '\\'], "_"),
    }
}

/// Writes `pages` as a tar archive at `path`, in order.
///
/// The archive is assembled in a temporary file beside `path` and only renamed
/// into place once complete, so a failed chapter leaves no `.cbt` behind.
pub fn write_archive(
    path: &Path,
    title: &str,
    chapter_label: &str,
    pages: Vec<DownloadedPage>,
) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|err| RipError::filesystem("create archive dir", parent, err))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".cbtrip-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|err| RipError::filesystem("create temporary archive in", parent, err))?;

    {
        let mut builder = tar::Builder::new(BufWriter::new(temp.as_file_mut()));
        for (index, page) in pages.into_iter().enumerate() {
            let entry = entry_name(title, chapter_label, index);
            append_page(&mut builder, &entry, page)?;
        }

        let mut writer = builder
            .into_inner()
            .map_err(|source| RipError::ArchiveFormat {
                entry: "end of archive".to_owned(),
                source,
            })?;
        writer
            .flush()
            .map_err(|err| RipError::filesystem("write archive", path, err))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(ARCHIVE_FILE_MODE))
            .map_err(|err| RipError::filesystem("set permissions on", temp.path(), err))?;
    }

    temp.persist(path)
        .map_err(|err| RipError::filesystem("move archive into place at", path, err.error))?;
    Ok(())
}

fn append_page<W: io::Write>(
    builder: &mut tar::Builder<W>,
    entry: &str,
    page: DownloadedPage,
) -> Result<()> {
    let declared = page.size();
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(ENTRY_MODE);
    header.set_size(declared);

    // The body is dropped, closing the response, before the next page starts.
    let mut body = ExactSize::new(page.into_body(), declared);
    match builder.append_data(&mut header, entry, &mut body) {
        Ok(()) => Ok(()),
        Err(source) => match body.problem {
            Some(problem) => Err(RipError::SizeMismatch {
                entry: entry.to_owned(),
                declared,
                problem,
            }),
            None => Err(RipError::ArchiveFormat {
                entry: entry.to_owned(),
                source,
            }),
        },
    }
}

/// Yields exactly `declared` bytes and fails if the inner stream ends early or
/// still has data afterwards.
struct ExactSize<R> {
    inner: R,
    declared: u64,
    read: u64,
    problem: Option<SizeProblem>,
}

impl<R: Read> ExactSize<R> {
    fn new(inner: R, declared: u64) -> Self {
        Self {
            inner,
            declared,
            read: 0,
            problem: None,
        }
    }

    fn fail(&mut self, problem: SizeProblem) -> io::Error {
        self.problem = Some(problem);
        let kind = match problem {
            SizeProblem::Short(_) => io::ErrorKind::UnexpectedEof,
            SizeProblem::Long => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, problem)
    }
}

impl<R: Read> Read for ExactSize<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let remaining = self.declared - self.read;
        if remaining == 0 {
            let mut extra = [0_u8; 1];
            return match self.inner.read(&mut extra)? {
                0 => Ok(0),
                _ => Err(self.fail(SizeProblem::Long)),
            };
        }

        let limit = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..limit])?;
        if n == 0 {
            return Err(self.fail(SizeProblem::Short(self.read)));
        }
        self.read += n as u64;
        Ok(n)
    }
}
