//! Persistent comic collection: storage, word-weight indexing and phrase search.

pub mod collection;
pub mod error;
pub mod index;
mod ingest;
pub mod persist;
pub mod search;
pub mod tokenizer;

pub use collection::Collection;
pub use error::{Error, Result};
pub use index::{Comic, ComicId, Weight, WordId, WordRecord};
pub use search::{pick_best, Candidate};
