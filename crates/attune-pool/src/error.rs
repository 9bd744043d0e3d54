use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool log I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PoolError>;
