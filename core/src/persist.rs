use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::path::Path;

/// Bumped whenever the layout of any tree changes.
pub const SCHEMA_VERSION: u32 = 1;

pub(crate) const COMICS_TREE: &str = "comics";
pub(crate) const WORDS_TREE: &str = "words";
pub(crate) const WEIGHTS_TREE: &str = "word_weights";
const META_TREE: &str = "meta";
const META_KEY: &[u8] = b"schema";

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub created_at: String,
}

/// The open database together with the three relations of a collection.
pub(crate) struct Store {
    pub db: Db,
    pub comics: Tree,
    pub words: Tree,
    pub weights: Tree,
}

/// Open the collection at `path`, laying out a fresh schema if nothing is there yet.
///
/// An existing store is never rewritten: it must already carry the metadata
/// record and all three relations, otherwise opening fails. The one exception
/// is a store whose first initialization was cut short, which is recognised
/// by every relation being empty and is initialized again.
pub(crate) fn open_store(path: &Path) -> Result<Store> {
    let db = sled::Config::new().path(path).open()?;

    let fresh = if db.was_recovered() { check_schema(&db, path)? } else { true };
    if fresh {
        tracing::info!(path = %path.display(), "creating new collection");
    }

    let store = Store {
        comics: db.open_tree(COMICS_TREE)?,
        words: db.open_tree(WORDS_TREE)?,
        weights: db.open_tree(WEIGHTS_TREE)?,
        db,
    };

    if fresh {
        let meta = MetaFile {
            version: SCHEMA_VERSION,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "".into()),
        };
        save_meta(&store.db, &meta)?;
        store.db.flush()?;
    }
    Ok(store)
}

/// Validate an existing store. Returns `true` when it holds no data at all and
/// still needs its schema laid out.
fn check_schema(db: &Db, path: &Path) -> Result<bool> {
    let schema_err = |reason: String| Error::Schema { path: path.to_path_buf(), reason };

    let names = db.tree_names();
    let has_tree = |tree: &str| names.iter().any(|n| &n[..] == tree.as_bytes());
    let meta = if has_tree(META_TREE) { load_meta(db)? } else { None };

    let mut untouched = db.is_empty();
    let mut missing = None;
    for tree in [COMICS_TREE, WORDS_TREE, WEIGHTS_TREE] {
        if has_tree(tree) {
            untouched &= db.open_tree(tree)?.is_empty();
        } else {
            missing = missing.or(Some(tree));
        }
    }

    if let Some(meta) = &meta {
        if meta.version != SCHEMA_VERSION {
            return Err(schema_err(format!(
                "schema version {} (expected {SCHEMA_VERSION})",
                meta.version
            )));
        }
    }

    match (meta, missing) {
        (Some(meta), None) => {
            tracing::debug!(
                path = %path.display(),
                created_at = %meta.created_at,
                "opened existing collection"
            );
            Ok(false)
        }
        _ if untouched => {
            tracing::warn!(
                path = %path.display(),
                "collection was never fully initialized, initializing again"
            );
            Ok(true)
        }
        (None, _) => Err(schema_err("missing schema metadata".into())),
        (Some(_), Some(tree)) => Err(schema_err(format!("missing relation `{tree}`"))),
    }
}

pub fn save_meta(db: &Db, meta: &MetaFile) -> Result<()> {
    let json = serde_json::to_vec_pretty(meta)?;
    db.open_tree(META_TREE)?.insert(META_KEY, json)?;
    Ok(())
}

pub fn load_meta(db: &Db) -> Result<Option<MetaFile>> {
    match db.open_tree(META_TREE)?.get(META_KEY)? {
        Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
        None => Ok(None),
    }
}
