mod common;

use std::collections::{BTreeSet, HashSet};

use radarcli::sync::{Classification, ReleaseFilter};

use common::track;

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn ordered(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn test_classification_precedence() {
    // t1 is in both the snapshot and the previous ids, the snapshot wins
    let snapshot = set(&["t1"]);
    let previous = ordered(&["t1", "t2"]);
    let mut filter = ReleaseFilter::new(&snapshot, &previous);

    assert_eq!(
        filter.classify(&track("t1")),
        Classification::AlreadyInPlaylist
    );
    assert_eq!(
        filter.classify(&track("t2")),
        Classification::PreviouslySynced
    );
    assert_eq!(filter.classify(&track("t3")), Classification::New);
    assert_eq!(
        filter.classify(&track("t3")),
        Classification::DuplicateThisRun
    );

    let added = filter.into_added();
    assert_eq!(added.track_ids, vec!["t3".to_string()]);
}

#[test]
fn test_added_keeps_discovery_order() {
    let snapshot = HashSet::new();
    let previous = BTreeSet::new();
    let mut filter = ReleaseFilter::new(&snapshot, &previous);

    for id in ["zz", "aa", "mm", "aa"] {
        filter.classify(&track(id));
    }

    // Not sorted, first seen first listed
    assert_eq!(filter.added().track_ids, vec!["zz", "aa", "mm"]);
    assert_eq!(filter.added().descriptions.len(), 3);
    assert_eq!(filter.added().descriptions[0], "Artist - Track zz");
}

#[test]
fn test_added_since_mark() {
    let snapshot = HashSet::new();
    let previous = BTreeSet::new();
    let mut filter = ReleaseFilter::new(&snapshot, &previous);

    filter.classify(&track("a"));
    let mark = filter.added().len();
    filter.classify(&track("b"));
    filter.classify(&track("a"));
    filter.classify(&track("c"));

    assert_eq!(filter.added_since(mark), ["b".to_string(), "c".to_string()]);
    assert!(filter.added_since(10).is_empty());
}

#[test]
fn test_empty_baseline_adds_everything_once() {
    let snapshot = HashSet::new();
    let previous = BTreeSet::new();
    let mut filter = ReleaseFilter::new(&snapshot, &previous);

    let results: Vec<_> = ["x", "y", "x"]
        .iter()
        .map(|id| filter.classify(&track(id)))
        .collect();

    assert_eq!(
        results,
        vec![
            Classification::New,
            Classification::New,
            Classification::DuplicateThisRun
        ]
    );
    assert_eq!(filter.added().len(), 2);
}
