use crate::error::Result;
use std::path::{Path, PathBuf};

/// Filesystem seam for the pipeline and the batch executor.
pub trait FileStore: Send + Sync {
    fn read_all(&self, path: &Path) -> Result<Vec<u8>>;

    /// Must never leave a partially written file at `path`.
    fn write_all(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn size(&self, path: &Path) -> Result<u64>;

    /// Regular files under `root`, sorted. A file root lists itself.
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>>;
}
