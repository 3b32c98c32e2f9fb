//! Deliverable packaging.
//!
//! Stage 9/10: zip the whole export tree into the OS temp directory and hand
//! the result over — as a filesystem path (batch) or as a byte stream with
//! unconditional cleanup of the temporary archive (interactive).
//!
//! Every file under the export dir is stored with its forward-slash relative
//! name; directories themselves get no entries. Must only run after all
//! file-producing stages finished, since it archives whatever is on disk.

use crate::options::RunConfig;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot walk export dir: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("cannot create archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Pack the export directory into `<temp>/<zip_name>` and return the path.
/// A stale archive of the same name is replaced.
pub fn pack(cfg: &RunConfig) -> Result<PathBuf, PackageError> {
    let zip_path = std::env::temp_dir().join(&cfg.zip_name);
    if zip_path.exists() {
        let _ = fs::remove_file(&zip_path);
    }

    let file = File::create(&zip_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in WalkDir::new(&cfg.export_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = archive_name(&cfg.export_dir, entry.path());
        if name.is_empty() {
            continue;
        }
        zip.start_file(name, options)?;
        let mut src = File::open(entry.path())?;
        io::copy(&mut src, &mut zip)?;
    }

    zip.finish()?;
    Ok(zip_path)
}

/// Relative, forward-slash entry name for one file.
fn archive_name(root: &Path, abs: &Path) -> String {
    abs.strip_prefix(root)
        .unwrap_or(abs)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Stream the archive bytes into `out`, then delete the temporary file.
/// Cleanup is unconditional: the bytes are already on their way, so the
/// archive is removed even when the copy ends early.
pub fn stream_and_remove(zip_path: &Path, out: &mut impl Write) -> io::Result<u64> {
    let result = File::open(zip_path).and_then(|mut f| io::copy(&mut f, out));
    let _ = fs::remove_file(zip_path);
    result
}
