//! Tests for the sample store: admission, upgrade and eviction.

use super::sample::{Sample, SampleKey};
use super::store::SampleStore;
use crate::config::SampleMode;

/// Candidate over 3 columns whose full-key less-than count is `row`.
fn candidate(row: u64, eq: [u64; 3], column: usize, hash: u32) -> Sample {
    let mut s = Sample::try_new(3, column).expect("alloc");
    s.counts.eq.copy_from_slice(&eq);
    s.counts.lt.copy_from_slice(&[0, 0, row]);
    s.key = SampleKey::Integer(row as i64);
    s.hash = hash;
    s
}

fn periodic(row: u64) -> Sample {
    let mut s = candidate(row, [1, 1, 1], 0, 0);
    s.is_periodic = true;
    s
}

fn keys(store: &SampleStore) -> Vec<i64> {
    store
        .iter()
        .map(|s| match s.key() {
            SampleKey::Integer(k) => *k,
            SampleKey::Bytes(_) => panic!("integer keys only"),
        })
        .collect()
}

#[test]
fn test_store_admits_while_not_full() {
    let mut store = SampleStore::try_new(2, 3, SampleMode::PerColumn).expect("alloc");
    let weak = candidate(0, [1, 1, 1], 0, 0);

    assert!(store.admits(&weak));
    store.insert(&weak, 0).expect("insert");
    assert!(store.admits(&weak));
    assert_eq!(store.worst(), None);
}

#[test]
fn test_store_tracks_worst_when_full() {
    // Arrange
    let mut store = SampleStore::try_new(2, 3, SampleMode::PerColumn).expect("alloc");
    store
        .insert(&candidate(0, [5, 1, 1], 0, 0), 0)
        .expect("insert");
    store
        .insert(&candidate(1, [2, 1, 1], 0, 0), 0)
        .expect("insert");

    // Assert
    assert!(store.is_full());
    assert_eq!(store.worst(), Some(1));
    assert!(store.admits(&candidate(2, [3, 1, 1], 0, 0)));
    assert!(!store.admits(&candidate(2, [1, 1, 1], 0, 0)));
}

#[test]
fn test_store_evicts_worst_and_keeps_order() {
    // Arrange
    let mut store = SampleStore::try_new(2, 3, SampleMode::PerColumn).expect("alloc");
    store
        .insert(&candidate(0, [2, 1, 1], 0, 0), 0)
        .expect("insert");
    store
        .insert(&candidate(1, [5, 1, 1], 0, 0), 0)
        .expect("insert");

    // Act
    store
        .insert(&candidate(2, [3, 1, 1], 0, 0), 0)
        .expect("insert");

    // Assert
    assert_eq!(store.len(), 2);
    assert_eq!(keys(&store), vec![1, 2]);
    assert_eq!(store.worst(), Some(1));
}

#[test]
fn test_store_upgrades_sample_sharing_prefix() {
    // Arrange: a sample retained for column 1, prefix through column 0 still open
    let mut store = SampleStore::try_new(4, 3, SampleMode::PerColumn).expect("alloc");
    store
        .insert(&candidate(0, [6, 3, 1], 1, 0), 1)
        .expect("insert");

    // Act: the column 0 run closes with the same prefix
    store
        .insert(&candidate(2, [6, 1, 1], 0, 0), 0)
        .expect("insert");

    // Assert
    assert_eq!(store.len(), 1);
    let entry = store.iter().next().expect("entry");
    assert_eq!(entry.column(), 0);
    assert_eq!(entry.eq_counts(), &[Some(6), Some(3), Some(1)]);
    assert_eq!(keys(&store), vec![0]);
}

#[test]
fn test_store_upgrade_picks_most_desirable() {
    // Arrange: two column-1 samples under one open column-0 prefix
    let mut store = SampleStore::try_new(4, 3, SampleMode::PerColumn).expect("alloc");
    store
        .insert(&candidate(0, [9, 2, 1], 1, 0), 1)
        .expect("insert");
    store
        .insert(&candidate(2, [9, 4, 1], 1, 0), 1)
        .expect("insert");

    // Act
    store
        .insert(&candidate(5, [9, 1, 1], 0, 0), 0)
        .expect("insert");

    // Assert
    let columns: Vec<usize> = store.iter().map(|s| s.column()).collect();
    assert_eq!(columns, vec![1, 0]);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_store_skips_prefix_covered_by_periodic() {
    // Arrange
    let mut store = SampleStore::try_new(4, 3, SampleMode::PerColumn).expect("alloc");
    store.insert(&periodic(0), 2).expect("insert");

    // Act
    store
        .insert(&candidate(1, [3, 1, 1], 1, 0), 1)
        .expect("insert");

    // Assert
    assert_eq!(store.len(), 1);
    assert!(store.iter().all(|s| s.is_periodic()));
}

#[test]
fn test_store_full_of_periodic_samples() {
    // Arrange
    let mut store = SampleStore::try_new(2, 3, SampleMode::PerColumn).expect("alloc");
    store.insert(&periodic(0), 2).expect("insert");
    store.insert(&periodic(1), 2).expect("insert");
    store.backfill(0, &[1, 1, 1]);

    // Assert: no non-periodic candidate gets in
    assert_eq!(store.worst(), None);
    assert!(!store.admits(&candidate(2, [100, 1, 1], 0, 0)));

    // Act: another periodic sample replaces the oldest one
    store.insert(&periodic(3), 2).expect("insert");
    assert_eq!(keys(&store), vec![1, 3]);
}

#[test]
fn test_store_eviction_reuses_byte_key_slot() {
    // Arrange
    let mut store = SampleStore::try_new(1, 3, SampleMode::Leading).expect("alloc");
    let mut first = candidate(0, [1, 1, 1], 0, 0);
    first.key = SampleKey::Bytes(vec![0xaa; 16]);
    store.insert(&first, 0).expect("insert");

    // Act
    let mut second = candidate(1, [2, 1, 1], 0, 0);
    second.key = SampleKey::Bytes(vec![0xbb; 4]);
    store.insert(&second, 0).expect("insert");

    // Assert
    assert_eq!(store.len(), 1);
    let entry = store.iter().next().expect("entry");
    assert_eq!(entry.key(), &SampleKey::Bytes(vec![0xbb; 4]));
    assert_eq!(entry.eq_counts()[0], Some(2));
}

#[test]
fn test_backfill_fills_pending_counts() {
    let mut store = SampleStore::try_new(2, 3, SampleMode::PerColumn).expect("alloc");
    store.insert(&periodic(0), 2).expect("insert");

    store.backfill(1, &[7, 4, 1]);

    let entry = store.iter().next().expect("entry");
    assert_eq!(entry.eq_counts(), &[None, Some(4), Some(1)]);
}

#[test]
fn test_store_eviction_grows_byte_key_slot() {
    // Arrange: the slot being reused holds a shorter key than the newcomer
    let mut store = SampleStore::try_new(1, 3, SampleMode::PerColumn).expect("alloc");
    let mut first = candidate(0, [1, 1, 1], 0, 0);
    first.key = SampleKey::Bytes(vec![0x01; 4]);
    store.insert(&first, 0).expect("insert");

    // Act
    let mut second = candidate(1, [3, 1, 1], 0, 0);
    second.key = SampleKey::Bytes(vec![0x02; 64]);
    store.insert(&second, 0).expect("insert");

    // Assert
    assert_eq!(keys_len(&store), vec![64]);
    let entry = store.iter().next().expect("entry");
    assert_eq!(entry.key(), &SampleKey::Bytes(vec![0x02; 64]));
    assert_eq!(entry.eq_counts(), &[Some(3), Some(1), Some(1)]);
}

fn keys_len(store: &SampleStore) -> Vec<usize> {
    store
        .iter()
        .map(|s| match s.key() {
            SampleKey::Bytes(b) => b.len(),
            SampleKey::Integer(_) => 0,
        })
        .collect()
}
