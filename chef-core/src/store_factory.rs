use std::sync::Arc;

use crate::store::FileStore;
use crate::store_fs::FsStore;

pub enum Backend {
    Fs,
}

pub fn open_store(backend: Backend) -> Arc<dyn FileStore> {
    match backend {
        Backend::Fs => Arc::new(FsStore),
    }
}
