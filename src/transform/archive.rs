//! Deterministic zip packaging of HTML bundles
//!
//! Entries are written in sorted path order with a fixed timestamp and mode,
//! and the archive is stored under the SHA-256 of its bytes. Packaging the
//! same directory contents twice yields the same file.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::transform::TransformError;

fn collect_files(
    root: &Path,
    dir: &Path,
    files: &mut Vec<(String, PathBuf)>,
) -> Result<(), TransformError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else if path.is_file() {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| TransformError::Other(format!("{}: {}", path.display(), e)))?;
            let name = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((name, path));
        }
    }
    Ok(())
}

/// Zip a directory into `zip_dir`, returning the archive path
pub fn create_predictable_zip(dir: &Path, zip_dir: &Path) -> Result<PathBuf, TransformError> {
    let mut files = Vec::new();
    collect_files(dir, dir, &mut files)?;
    files.sort();

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, path) in &files {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&fs::read(path)?)?;
    }
    let bytes = zip.finish()?.into_inner();

    let digest = hex::encode(Sha256::digest(&bytes));
    fs::create_dir_all(zip_dir)?;
    let archive = zip_dir.join(format!("{}.zip", digest));
    if !archive.exists() {
        fs::write(&archive, &bytes)?;
    }
    debug!("Packaged {} files into {}", files.len(), archive.display());

    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bundle(dir: &Path) {
        fs::create_dir_all(dir.join("files/images")).unwrap();
        fs::write(dir.join("index.html"), "<html><body>hi</body></html>").unwrap();
        fs::write(dir.join("files/images/a.png"), [1u8, 2, 3]).unwrap();
    }

    #[test]
    fn test_same_contents_same_archive() {
        let work = tempfile::tempdir().unwrap();
        let zips = work.path().join("zips");

        let first = work.path().join("one");
        let second = work.path().join("two");
        write_bundle(&first);
        write_bundle(&second);

        let a = create_predictable_zip(&first, &zips).unwrap();
        let b = create_predictable_zip(&second, &zips).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.extension().unwrap(), "zip");
        assert_eq!(fs::read_dir(&zips).unwrap().count(), 1);
    }

    #[test]
    fn test_entries_are_sorted_relative_paths() {
        let work = tempfile::tempdir().unwrap();
        let bundle = work.path().join("bundle");
        write_bundle(&bundle);

        let archive = create_predictable_zip(&bundle, &work.path().join("zips")).unwrap();
        let mut zip = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["files/images/a.png", "index.html"]);
    }

    #[test]
    fn test_different_contents_different_archive() {
        let work = tempfile::tempdir().unwrap();
        let zips = work.path().join("zips");

        let first = work.path().join("one");
        write_bundle(&first);
        let a = create_predictable_zip(&first, &zips).unwrap();

        fs::write(first.join("index.html"), "<html><body>changed</body></html>").unwrap();
        let b = create_predictable_zip(&first, &zips).unwrap();
        assert_ne!(a, b);
    }
}
