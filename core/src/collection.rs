use crate::error::Result;
use crate::index::{comic_key, decode_weight, weight_key, Comic, ComicId, Weight, WordRecord};
use crate::persist::open_store;
use crate::tokenizer::term;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sled::transaction::ConflictableTransactionResult;
use sled::{Db, Tree};
use std::path::Path;

/// Handle to an on-disk comic collection.
///
/// Every operation goes through this handle; there is no shared global
/// connection. Mutations are single transactions across the affected trees.
pub struct Collection {
    pub(crate) db: Db,
    pub(crate) comics: Tree,
    pub(crate) words: Tree,
    pub(crate) weights: Tree,
    pub(crate) rng: Mutex<StdRng>,
}

impl Collection {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = open_store(path.as_ref())?;
        Ok(Self {
            db: store.db,
            comics: store.comics,
            words: store.words,
            weights: store.weights,
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    /// Replace the random source used for tie-breaking and [`Collection::random`].
    pub fn with_rng(self, rng: StdRng) -> Self {
        *self.rng.lock() = rng;
        self
    }

    /// Flush outstanding writes and release the store.
    pub fn close(self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.comics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comics.is_empty()
    }

    pub fn get(&self, id: ComicId) -> Result<Option<Comic>> {
        match self.comics.get(comic_key(id))? {
            Some(raw) => Ok(Some(decode_comic(&raw)?)),
            None => Ok(None),
        }
    }

    /// The comic with the highest id.
    pub fn latest(&self) -> Result<Option<Comic>> {
        match self.comics.last()? {
            Some((_, raw)) => Ok(Some(decode_comic(&raw)?)),
            None => Ok(None),
        }
    }

    /// A comic picked uniformly at random.
    pub fn random(&self) -> Result<Option<Comic>> {
        let count = self.comics.len();
        if count == 0 {
            return Ok(None);
        }
        let skip = self.rng.lock().random_range(0..count);
        match self.comics.iter().values().nth(skip) {
            Some(raw) => Ok(Some(decode_comic(&raw?)?)),
            None => Ok(None),
        }
    }

    /// Look up a word under the same normalization used when indexing.
    pub fn word(&self, word: &str) -> Result<Option<WordRecord>> {
        match self.words.get(term(word).as_bytes())? {
            Some(raw) => Ok(Some(decode_word(&raw)?)),
            None => Ok(None),
        }
    }

    /// How often `word` occurs in the indexed text of comic `id`.
    pub fn weight(&self, word: &str, id: ComicId) -> Result<Option<Weight>> {
        let Some(record) = self.word(word)? else {
            return Ok(None);
        };
        match self.weights.get(weight_key(record.id, id))? {
            Some(raw) => Ok(Some(decode_weight(&raw)?)),
            None => Ok(None),
        }
    }

    /// Exclude `word` from search ranking. The word is normalized like indexed
    /// text, so `"don't"` blacklists the indexed `"dont"`. Unknown words are
    /// added already blacklisted; blacklisting twice has no further effect.
    pub fn blacklist(&self, word: &str) -> Result<()> {
        let normalized = term(word);
        if normalized.is_empty() {
            tracing::debug!(word, "ignoring empty blacklist entry");
            return Ok(());
        }

        let changed = self
            .words
            .transaction(|words| -> ConflictableTransactionResult<bool, crate::Error> {
                let record = match words.get(normalized.as_bytes())? {
                    Some(raw) => {
                        let existing = aborting(decode_word(&raw))?;
                        if existing.blacklisted {
                            return Ok(false);
                        }
                        WordRecord { blacklisted: true, ..existing }
                    }
                    None => WordRecord { id: words.generate_id()?, blacklisted: true },
                };
                words.insert(normalized.as_bytes(), aborting(encode_word(&record))?)?;
                Ok(true)
            })?;

        if changed {
            self.db.flush()?;
            tracing::info!(word = %normalized, "blacklisted word");
        }
        Ok(())
    }
}

pub(crate) fn decode_comic(raw: &[u8]) -> Result<Comic> {
    Ok(bincode::deserialize(raw)?)
}

pub(crate) fn decode_word(raw: &[u8]) -> Result<WordRecord> {
    Ok(bincode::deserialize(raw)?)
}

pub(crate) fn encode_word(record: &WordRecord) -> Result<Vec<u8>> {
    Ok(bincode::serialize(record)?)
}

/// Turn a store error raised inside a transaction into an abort of that transaction.
pub(crate) fn aborting<T>(
    res: Result<T>,
) -> std::result::Result<T, sled::transaction::ConflictableTransactionError<crate::Error>> {
    res.map_err(sled::transaction::ConflictableTransactionError::Abort)
}
