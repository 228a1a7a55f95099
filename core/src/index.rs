use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type ComicId = u64;
pub type WordId = u64;
pub type Weight = u32;

/// A single comic as stored in the collection. Never modified once added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comic {
    pub id: ComicId,
    pub img_url: String,
    pub title: String,
    pub alt: String,
    pub transcript: String,
}

impl Comic {
    /// The indexable text: title, alt text and transcript joined by single spaces.
    pub fn text(&self) -> String {
        format!("{} {} {}", self.title, self.alt, self.transcript)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: WordId,
    pub blacklisted: bool,
}

// Ids are stored big-endian so that key order in every tree matches numeric order.

pub(crate) fn comic_key(id: ComicId) -> [u8; 8] {
    id.to_be_bytes()
}

pub(crate) fn comic_id_from_key(key: &[u8]) -> Result<ComicId> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| Error::Corrupt("comic key"))?;
    Ok(ComicId::from_be_bytes(bytes))
}

/// Weight rows are keyed by `word_id ++ comic_id`, so all rows of a word share a prefix.
pub(crate) fn weight_key(word: WordId, comic: ComicId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&word.to_be_bytes());
    key[8..].copy_from_slice(&comic.to_be_bytes());
    key
}

pub(crate) fn weight_prefix(word: WordId) -> [u8; 8] {
    word.to_be_bytes()
}

pub(crate) fn comic_id_from_weight_key(key: &[u8]) -> Result<ComicId> {
    if key.len() != 16 {
        return Err(Error::Corrupt("word weight key"));
    }
    comic_id_from_key(&key[8..])
}

pub(crate) fn encode_weight(weight: Weight) -> [u8; 4] {
    weight.to_be_bytes()
}

pub(crate) fn decode_weight(value: &[u8]) -> Result<Weight> {
    let bytes: [u8; 4] = value.try_into().map_err(|_| Error::Corrupt("word weight"))?;
    Ok(Weight::from_be_bytes(bytes))
}
