use crate::collection::{aborting, decode_word, encode_word, Collection};
use crate::error::{Error, Result};
use crate::index::{comic_key, decode_weight, encode_weight, weight_key, Comic, Weight, WordRecord};
use crate::tokenizer::tokenize;
use sled::transaction::{abort, ConflictableTransactionResult};
use sled::Transactional;
use std::collections::BTreeMap;

impl Collection {
    /// Store `comic` and index the words of its title, alt text and transcript.
    ///
    /// Fails with [`Error::DuplicateComic`] if the id is taken. Either the comic
    /// and all of its word weights are written, or nothing is.
    pub fn add_comic(&self, comic: &Comic) -> Result<()> {
        // Occurrences are tallied up front; each tally is then added to the
        // stored (word, comic) weight in one step.
        let mut counts: BTreeMap<String, Weight> = BTreeMap::new();
        for token in tokenize(&comic.text()) {
            *counts.entry(token).or_insert(0) += 1;
        }
        let record = bincode::serialize(comic)?;
        let key = comic_key(comic.id);

        let new_words = (&self.comics, &self.words, &self.weights).transaction(
            |(comics, words, weights)| -> ConflictableTransactionResult<usize, Error> {
                if comics.get(key)?.is_some() {
                    return abort(Error::DuplicateComic(comic.id));
                }
                comics.insert(&key[..], record.as_slice())?;

                let mut new_words = 0;
                for (token, count) in &counts {
                    let word_id = match words.get(token.as_bytes())? {
                        Some(raw) => aborting(decode_word(&raw))?.id,
                        None => {
                            let record =
                                WordRecord { id: words.generate_id()?, blacklisted: false };
                            words.insert(token.as_bytes(), aborting(encode_word(&record))?)?;
                            new_words += 1;
                            record.id
                        }
                    };

                    let wkey = weight_key(word_id, comic.id);
                    let weight = match weights.get(wkey)? {
                        Some(raw) => aborting(decode_weight(&raw))? + count,
                        None => *count,
                    };
                    weights.insert(&wkey[..], &encode_weight(weight)[..])?;
                }
                Ok(new_words)
            },
        )?;

        self.db.flush()?;
        tracing::info!(comic_id = comic.id, words = counts.len(), new_words, "indexed comic");
        Ok(())
    }
}
