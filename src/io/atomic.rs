use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Failure of the updater itself (as opposed to the line transform)
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write temporary file next to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not replace {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

/// What to emit for one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit {
    /// Copy the line verbatim, terminator included
    Keep,
    /// Emit this text instead; it must carry its own terminator
    Replace(String),
    /// Emit this text followed by the source line's own terminator
    Rewrite(String),
    /// Drop the line
    Omit,
}

/// Per-run tally, used for logging and by callers that report changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub kept: usize,
    pub replaced: usize,
    pub omitted: usize,
}

/// Stream every line of `path` through `transform` into a temporary file in
/// the same directory, then rename it over `path`.
///
/// `transform` receives the 0-based line position and the line without its
/// terminator. On any failure the temporary file is removed and `path` is
/// left exactly as it was.
///
/// Two processes rewriting the same file concurrently can race on the final
/// rename; the last one wins and the other's change is lost.
pub fn rewrite_lines<F, E>(path: &Path, transform: F) -> Result<RewriteSummary, E>
where
    F: FnMut(usize, &str) -> Result<LineEdit, E>,
    E: From<UpdateError>,
{
    rewrite(path, transform, None)
}

/// Append one line to the end of `path` through the same temp-file-and-rename
/// path as [`rewrite_lines`]. `line` must carry its own terminator; a newline
/// is inserted first if the file does not already end with one.
pub fn append_line(path: &Path, line: &str) -> Result<RewriteSummary, UpdateError> {
    rewrite(
        path,
        |_, _| -> Result<_, UpdateError> { Ok(LineEdit::Keep) },
        Some(line),
    )
}

fn rewrite<F, E>(path: &Path, mut transform: F, tail: Option<&str>) -> Result<RewriteSummary, E>
where
    F: FnMut(usize, &str) -> Result<LineEdit, E>,
    E: From<UpdateError>,
{
    let source = File::open(path).map_err(|e| UpdateError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let permissions = source.metadata().ok().map(|m| m.permissions());
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| UpdateError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    let streamed = stream_lines(path, BufReader::new(source), &mut tmp, &mut transform, tail);
    let summary = match streamed {
        Ok(summary) => summary,
        Err(e) => {
            let tmp_path = tmp.path().to_path_buf();
            if let Err(close_err) = tmp.close() {
                tracing::warn!(
                    path = %tmp_path.display(),
                    error = %close_err,
                    "could not remove temporary file after failed rewrite"
                );
            } else {
                tracing::debug!(path = %path.display(), "rewrite aborted, temporary file removed");
            }
            return Err(e);
        }
    };

    if let Some(permissions) = permissions
        && let Err(e) = fs::set_permissions(tmp.path(), permissions)
    {
        tracing::debug!(error = %e, "could not copy permissions to temporary file");
    }
    tmp.as_file().sync_all().map_err(|e| UpdateError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    tmp.persist(path).map_err(|e| UpdateError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!(
        path = %path.display(),
        kept = summary.kept,
        replaced = summary.replaced,
        omitted = summary.omitted,
        "task file rewritten"
    );
    Ok(summary)
}

fn stream_lines<R, F, E>(
    path: &Path,
    mut reader: R,
    tmp: &mut NamedTempFile,
    transform: &mut F,
    tail: Option<&str>,
) -> Result<RewriteSummary, E>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<LineEdit, E>,
    E: From<UpdateError>,
{
    let write_err = |e: io::Error| UpdateError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    let mut writer = BufWriter::new(tmp);
    let mut summary = RewriteSummary::default();
    let mut buf = String::new();
    let mut index = 0;
    let mut at_line_start = true;

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf).map_err(|e| UpdateError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if read == 0 {
            break;
        }
        let line = buf
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(buf.as_str());

        match transform(index, line)? {
            LineEdit::Keep => {
                writer.write_all(buf.as_bytes()).map_err(write_err)?;
                at_line_start = buf.ends_with('\n');
                summary.kept += 1;
            }
            LineEdit::Replace(text) => {
                writer.write_all(text.as_bytes()).map_err(write_err)?;
                if !text.is_empty() {
                    at_line_start = text.ends_with('\n');
                }
                summary.replaced += 1;
            }
            LineEdit::Rewrite(text) => {
                let terminator = &buf[line.len()..];
                writer.write_all(text.as_bytes()).map_err(write_err)?;
                writer.write_all(terminator.as_bytes()).map_err(write_err)?;
                if !text.is_empty() || !terminator.is_empty() {
                    at_line_start = terminator.ends_with('\n');
                }
                summary.replaced += 1;
            }
            LineEdit::Omit => summary.omitted += 1,
        }
        index += 1;
    }

    if let Some(tail) = tail {
        if !at_line_start {
            writer.write_all(b"\n").map_err(write_err)?;
        }
        writer.write_all(tail.as_bytes()).map_err(write_err)?;
    }

    writer.flush().map_err(write_err)?;
    Ok(summary)
}

/// Directory for the temporary file; `.` for a bare file name
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Write a whole file atomically via a temporary file in the same directory
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
