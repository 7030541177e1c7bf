use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::Result;
use crate::store::FileStore;

/// Local disk. Writes go to a temporary sibling and are renamed into place.
#[derive(Clone, Debug, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_all(&self, path: &Path, data: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn size(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for e in WalkDir::new(root).follow_links(false) {
            let e = e.map_err(std::io::Error::other)?;
            if e.file_type().is_file() {
                files.push(e.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_is_visible_only_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.emoji");
        FsStore.write_all(&target, b"payload").unwrap();
        assert_eq!(FsStore.read_all(&target).unwrap(), b"payload");
        assert_eq!(FsStore.size(&target).unwrap(), 7);
        // no temp files left beside the target
        let siblings = FsStore.list(target.parent().unwrap()).unwrap();
        assert_eq!(siblings, vec![target]);
    }

    #[test]
    fn list_is_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "sub/c.txt"] {
            FsStore.write_all(&dir.path().join(name), b"x").unwrap();
        }
        let got = FsStore.list(dir.path()).unwrap();
        let names: Vec<_> = got
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.txt"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStore.read_all(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, crate::error::ChefError::Io(_)));
    }
}
