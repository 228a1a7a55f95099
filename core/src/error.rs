use std::path::PathBuf;

use sled::transaction::TransactionError;

use crate::ComicId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(sled::Error),

    #[error("corrupt record: {0}")]
    Codec(#[from] bincode::Error),

    #[error("corrupt collection metadata: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("collection at {path} does not match the expected schema: {reason}")]
    Schema { path: PathBuf, reason: String },

    #[error("corrupt {0} entry")]
    Corrupt(&'static str),

    #[error("comic {0} is already in the collection")]
    DuplicateComic(ComicId),
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(e) => Error::Io(e),
            other => Error::Storage(other),
        }
    }
}

impl From<TransactionError<Error>> for Error {
    fn from(err: TransactionError<Error>) -> Self {
        match err {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => e.into(),
        }
    }
}
