use crate::collection::{decode_word, Collection};
use crate::error::Result;
use crate::index::{comic_id_from_weight_key, decode_weight, weight_prefix, Comic, ComicId};
use crate::tokenizer::term;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

/// How well a comic matched a query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Number of distinct query terms found in the comic.
    pub score: u32,
    /// Sum of the comic's weights for those terms.
    pub total_weight: u64,
}

impl Collection {
    /// Find the comic that best matches `terms`, if any term matches at all.
    pub fn search<S: AsRef<str>>(&self, terms: &[S]) -> Result<Option<Comic>> {
        let candidates = self.candidates(terms)?;
        let best = pick_best(&candidates, &mut *self.rng.lock());
        tracing::debug!(candidates = candidates.len(), ?best, "ranked comics");
        match best {
            Some(id) => self.get(id),
            None => Ok(None),
        }
    }

    /// Score every comic sharing at least one non-blacklisted term with the query.
    /// Terms are normalized like indexed text and counted once each, however
    /// often they repeat.
    pub fn candidates<S: AsRef<str>>(&self, terms: &[S]) -> Result<HashMap<ComicId, Candidate>> {
        let unique: BTreeSet<String> = terms
            .iter()
            .map(|t| term(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        let mut candidates: HashMap<ComicId, Candidate> = HashMap::new();
        for text in &unique {
            let Some(raw) = self.words.get(text.as_bytes())? else {
                continue;
            };
            let word = decode_word(&raw)?;
            if word.blacklisted {
                tracing::debug!(term = %text, "skipping blacklisted term");
                continue;
            }

            for entry in self.weights.scan_prefix(weight_prefix(word.id)) {
                let (key, value) = entry?;
                let candidate = candidates.entry(comic_id_from_weight_key(&key)?).or_default();
                candidate.score += 1;
                candidate.total_weight += u64::from(decode_weight(&value)?);
            }
        }
        Ok(candidates)
    }
}

/// Highest score wins, then highest total weight; remaining ties are settled by `rng`.
pub fn pick_best<R: Rng + ?Sized>(
    candidates: &HashMap<ComicId, Candidate>,
    rng: &mut R,
) -> Option<ComicId> {
    let top_score = candidates.values().map(|c| c.score).max()?;
    let top_weight = candidates
        .values()
        .filter(|c| c.score == top_score)
        .map(|c| c.total_weight)
        .max()?;

    let mut tied: Vec<ComicId> = candidates
        .iter()
        .filter(|(_, c)| c.score == top_score && c.total_weight == top_weight)
        .map(|(id, _)| *id)
        .collect();
    // HashMap order is unstable; sort so a seeded rng always picks the same comic.
    tied.sort_unstable();
    tied.choose(rng).copied()
}
