//! Reading documents and values, and writing edited documents back.

use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use crate::{
    document::{Document, ParseOptions},
    error::{Error, Result},
};

/// `None` and `-` both mean standard input.
pub fn is_stdin(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p == Path::new("-"))
}

/// Read a whole file, or all of standard input.
pub fn read_text(path: Option<&Path>) -> Result<String> {
    match path.filter(|_| !is_stdin(path)) {
        Some(path) => fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| Error::Input {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

pub fn load_document(path: Option<&Path>, options: &ParseOptions) -> Result<Document> {
    let text = read_text(path)?;
    let name = match path.filter(|_| !is_stdin(path)) {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    };
    tracing::debug!(source = %name, bytes = text.len(), "read document");
    Document::parse(&text, &name, options)
}

/// Replace `path` with `bytes` without ever leaving it half written.
///
/// The data goes to a temporary file in the same directory, which takes
/// over the permissions (and on unix the owner) of the file it replaces,
/// is synced, and is then renamed over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let output_error = |source| Error::Output {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .tempfile_in(dir)
        .map_err(output_error)?;
    tmp.write_all(bytes).map_err(output_error)?;

    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(output_error)?;
        #[cfg(unix)]
        preserve_owner(tmp.as_file(), &meta);
    }

    tmp.as_file().sync_all().map_err(output_error)?;
    tmp.persist(path).map_err(|e| output_error(e.error))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}

/// Only root can give a file away, so failure here is expected and ignored.
#[cfg(unix)]
fn preserve_owner(file: &File, meta: &fs::Metadata) {
    use std::os::unix::fs::{MetadataExt, fchown};

    if let Err(e) = fchown(file, Some(meta.uid()), Some(meta.gid())) {
        tracing::debug!(error = %e, "could not preserve file owner");
    }
}
