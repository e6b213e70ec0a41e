//! File system helpers that attach the offending path to I/O errors.

use std::io;
use std::path::Path;

use crate::error::{StoreError, StoreResult};

pub(crate) fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn read(path: &Path) -> StoreResult<Vec<u8>> {
    std::fs::read(path).map_err(io_error(path))
}

pub(crate) fn write(path: &Path, data: &[u8]) -> StoreResult<()> {
    std::fs::write(path, data).map_err(io_error(path))
}

pub(crate) fn create_dir_all(path: &Path) -> StoreResult<()> {
    std::fs::create_dir_all(path).map_err(io_error(path))
}

pub(crate) fn copy(from: &Path, to: &Path) -> StoreResult<()> {
    std::fs::copy(from, to).map(|_| ()).map_err(io_error(to))
}

pub(crate) fn remove_file(path: &Path) -> StoreResult<()> {
    std::fs::remove_file(path).map_err(io_error(path))
}
