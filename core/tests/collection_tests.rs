use comics_core::{Collection, Comic, Error};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use tempfile::{tempdir, TempDir};

fn comic(id: u64, transcript: &str) -> Comic {
    Comic {
        id,
        img_url: "https://www.google.com".into(),
        title: "A Title".into(),
        alt: "Some alt-text".into(),
        transcript: transcript.into(),
    }
}

fn open_seeded(seed: u64) -> (TempDir, Collection) {
    let dir = tempdir().unwrap();
    let c = Collection::open(dir.path().join("collection.db"))
        .unwrap()
        .with_rng(StdRng::seed_from_u64(seed));
    (dir, c)
}

fn hoi_collection() -> (TempDir, Collection) {
    let (dir, c) = open_seeded(7);
    c.add_comic(&comic(1, "Hoi hoi")).unwrap();
    c.add_comic(&comic(2, "Hoi hoi, mijn vrienden. Zei ik hoi? Hoi.")).unwrap();
    (dir, c)
}

#[test]
fn open_creates_the_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("collection.db");
    assert!(!path.exists());
    Collection::open(&path).unwrap().close().unwrap();
    assert!(path.exists());
}

#[test]
fn open_on_a_regular_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("collection.db");
    std::fs::write(&path, "not a collection").unwrap();
    let err = Collection::open(&path).err().unwrap();
    assert!(matches!(err, Error::Io(_) | Error::Storage(_)), "{err}");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not a collection");
}

#[test]
fn open_below_a_regular_file_fails() {
    let dir = tempdir().unwrap();
    let parent = dir.path().join("plain-file");
    std::fs::write(&parent, "").unwrap();
    let err = Collection::open(parent.join("collection.db")).err().unwrap();
    assert!(matches!(err, Error::Io(_) | Error::Storage(_)), "{err}");
}

#[test]
fn reopen_keeps_everything() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("collection.db");
    {
        let c = Collection::open(&path).unwrap();
        c.add_comic(&comic(4, "Hoi hoi")).unwrap();
        c.blacklist("title").unwrap();
        c.close().unwrap();
    }
    let c = Collection::open(&path).unwrap();
    assert_eq!(c.get(4).unwrap(), Some(comic(4, "Hoi hoi")));
    assert_eq!(c.weight("hoi", 4).unwrap(), Some(2));
    assert!(c.word("title").unwrap().unwrap().blacklisted);
}

#[test]
fn get_returns_what_was_added() {
    let (_dir, c) = open_seeded(1);
    let stored: Vec<Comic> = (1..=5).map(|i| comic(i, &format!("comic number {i}"))).collect();
    for d in &stored {
        c.add_comic(d).unwrap();
    }
    for d in &stored {
        assert_eq!(c.get(d.id).unwrap().as_ref(), Some(d));
    }
}

#[test]
fn get_unknown_id_is_none() {
    let (_dir, c) = hoi_collection();
    assert_eq!(c.get(999).unwrap(), None);
}

#[test]
fn empty_collection_has_no_latest_or_random() {
    let (_dir, c) = open_seeded(3);
    assert_eq!(c.latest().unwrap(), None);
    assert_eq!(c.random().unwrap(), None);
    assert_eq!(c.search(&["hoi"]).unwrap(), None);
}

#[test]
fn latest_is_highest_id_not_last_added() {
    let (_dir, c) = open_seeded(3);
    for id in 1..=10 {
        c.add_comic(&comic(id, "Hoi hoi")).unwrap();
    }
    c.add_comic(&comic(0, "Hoi hoi")).unwrap();
    assert_eq!(c.latest().unwrap().unwrap().id, 10);
}

#[test]
fn latest_orders_ids_numerically() {
    let (_dir, c) = open_seeded(3);
    for id in [9, 300, 1024, 255, 256] {
        c.add_comic(&comic(id, "")).unwrap();
    }
    assert_eq!(c.latest().unwrap().unwrap().id, 1024);
}

#[test]
fn random_covers_every_comic() {
    let (_dir, c) = open_seeded(11);
    let ids: BTreeSet<u64> = [2, 3, 5, 8, 13].into();
    for &id in &ids {
        c.add_comic(&comic(id, "")).unwrap();
    }
    let mut seen = BTreeSet::new();
    for _ in 0..500 {
        seen.insert(c.random().unwrap().unwrap().id);
    }
    assert_eq!(seen, ids);
}

#[test]
fn duplicate_id_is_an_error() {
    let (_dir, c) = hoi_collection();
    let err = c.add_comic(&comic(2, "something else")).unwrap_err();
    assert!(matches!(err, Error::DuplicateComic(2)));
    assert_eq!(c.len(), 2);
    assert_eq!(c.word("something").unwrap(), None);
}

#[test]
fn search_prefers_heavier_comic() {
    let (_dir, c) = hoi_collection();
    assert_eq!(c.weight("hoi", 2).unwrap(), Some(4));
    let found = c.search(&["the", "hoi", "one"]).unwrap().unwrap();
    assert_eq!(found.id, 2);
}

#[test]
fn search_on_unique_words_finds_that_comic() {
    let (_dir, c) = hoi_collection();
    c.add_comic(&comic(3, "A barrel floats away")).unwrap();
    assert_eq!(c.search(&["barrel"]).unwrap().unwrap().id, 3);
    assert_eq!(c.search(&["Vrienden"]).unwrap().unwrap().id, 2);
}

#[test]
fn search_prefers_more_matching_terms_over_weight() {
    let (_dir, c) = open_seeded(5);
    c.add_comic(&comic(1, "rocket rocket rocket rocket")).unwrap();
    c.add_comic(&comic(2, "rocket science")).unwrap();
    assert_eq!(c.search(&["rocket", "science"]).unwrap().unwrap().id, 2);
}

#[test]
fn repeated_query_terms_count_once() {
    let (_dir, c) = open_seeded(5);
    c.add_comic(&comic(1, "velociraptor velociraptor velociraptor")).unwrap();
    c.add_comic(&comic(2, "velociraptor fence")).unwrap();
    // Three copies of "velociraptor" still only make one matched term.
    let hit = c.search(&["velociraptor", "VELOCIRAPTOR", "velociraptor", "fence"]).unwrap();
    assert_eq!(hit.unwrap().id, 2);
}

#[test]
fn search_with_unknown_terms_is_none() {
    let (_dir, c) = hoi_collection();
    assert_eq!(c.search(&["zeppelin", "", "quux"]).unwrap(), None);
    assert_eq!(c.search::<&str>(&[]).unwrap(), None);
}

#[test]
fn tied_comics_are_the_only_results() {
    let (_dir, c) = open_seeded(99);
    c.add_comic(&comic(1, "compiling")).unwrap();
    c.add_comic(&comic(2, "compiling")).unwrap();
    c.add_comic(&comic(3, "")).unwrap();
    let mut seen = BTreeSet::new();
    for _ in 0..200 {
        seen.insert(c.search(&["compiling"]).unwrap().unwrap().id);
    }
    assert_eq!(seen, BTreeSet::from([1, 2]));
}

#[test]
fn seeded_tie_break_is_reproducible() {
    let picks = |seed| {
        let (_dir, c) = open_seeded(seed);
        for id in 1..=6 {
            c.add_comic(&comic(id, "standards")).unwrap();
        }
        (0..20)
            .map(|_| c.search(&["standards"]).unwrap().unwrap().id)
            .collect::<Vec<_>>()
    };
    assert_eq!(picks(1234), picks(1234));
}

#[test]
fn blacklisted_words_never_match() {
    let (_dir, c) = hoi_collection();
    c.blacklist("Hoi").unwrap();
    assert_eq!(c.search(&["hoi"]).unwrap(), None);
    assert_eq!(c.search(&["hoi", "vrienden"]).unwrap().unwrap().id, 2);
}

#[test]
fn blacklisted_words_no_longer_decide_ties() {
    let (_dir, c) = open_seeded(8);
    c.add_comic(&comic(1, "the the the the physics")).unwrap();
    c.add_comic(&comic(2, "physics")).unwrap();
    c.add_comic(&comic(3, "physics physics")).unwrap();
    assert_eq!(c.search(&["the", "physics"]).unwrap().unwrap().id, 1);
    c.blacklist("the").unwrap();
    assert_eq!(c.search(&["the", "physics"]).unwrap().unwrap().id, 3);
}

#[test]
fn blacklist_is_idempotent() {
    let (_dir, c) = hoi_collection();
    c.blacklist("and").unwrap();
    c.blacklist("and").unwrap();
    c.blacklist("hoi").unwrap();
    let hoi = c.word("hoi").unwrap().unwrap();
    c.blacklist("HOI").unwrap();
    assert_eq!(c.word("hoi").unwrap().unwrap(), hoi);
    assert!(c.word("and").unwrap().unwrap().blacklisted);
    assert_eq!(c.weight("hoi", 2).unwrap(), Some(4));
}

#[test]
fn apostrophes_are_ignored_when_searching_and_blacklisting() {
    let (_dir, c) = open_seeded(2);
    let mut dont = comic(1, "");
    dont.title = "Don't".into();
    c.add_comic(&dont).unwrap();

    assert_eq!(c.search(&["don't"]).unwrap().unwrap().id, 1);
    assert_eq!(c.weight("Don't", 1).unwrap(), Some(1));

    c.blacklist("don't").unwrap();
    assert!(c.word("dont").unwrap().unwrap().blacklisted);
    assert_eq!(c.search(&["dont"]).unwrap(), None);
    assert_eq!(c.search(&["don't"]).unwrap(), None);
}

#[test]
fn stopword_list_blacklists_indexed_contractions() {
    let (_dir, c) = open_seeded(2);
    c.add_comic(&comic(1, "You can't stop it, it's here")).unwrap();
    for word in comics_core::tokenizer::STOPWORDS {
        c.blacklist(word).unwrap();
    }
    assert_eq!(c.search(&["cant", "its", "you"]).unwrap(), None);
    assert_eq!(c.search(&["stop"]).unwrap().unwrap().id, 1);
}
