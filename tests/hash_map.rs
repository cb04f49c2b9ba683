use std::hash::BuildHasher;
use std::hash::Hasher;

use hopscotch_map::Entry;
use hopscotch_map::Error;
use hopscotch_map::HashMap;
use hopscotch_map::config::INITIAL_CAPACITY;
use hopscotch_map::config::INITIAL_NEIGHBORHOOD;
use hopscotch_map::config::MAX_LOAD_FACTOR;
use hopscotch_map::config::MAX_NEIGHBORHOOD;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use test_log::test;

#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;

impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;

    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}

impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}

    fn finish(&self) -> u64 {
        0xDEAD_BEEF
    }
}

fn assert_load_bound<K, V, S>(map: &HashMap<K, V, S>) {
    let bound = (map.capacity() as f64 * MAX_LOAD_FACTOR).floor() as usize;
    assert!(
        map.len() <= bound,
        "{} elements in {} buckets",
        map.len(),
        map.capacity()
    );
}

#[test]
fn duplicate_insert_keeps_first_value() {
    let mut map = HashMap::new();
    assert!(map.insert(1, "a"));
    assert!(map.insert(2, "b"));
    assert!(!map.insert(1, "c"));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"a"));
    assert_eq!(map.at(&1), Ok(&"a"));
}

#[test]
fn at_on_empty_map_reports_missing_key() {
    let map: HashMap<i32, String> = HashMap::new();
    assert_eq!(map.at(&5), Err(Error::KeyNotFound));
    assert_eq!(
        map.at(&5).unwrap_err().to_string(),
        "key not found in the hash map"
    );
    assert!(map.is_empty());
}

#[test]
fn sequential_keys_grow_the_table() {
    let mut map = HashMap::new();
    assert_eq!(map.capacity(), INITIAL_CAPACITY);
    assert_eq!(map.neighborhood_size(), INITIAL_NEIGHBORHOOD);

    for i in 0..100u32 {
        assert!(map.insert(i, i * 3));
        assert_load_bound(&map);
    }

    assert!(map.capacity() > INITIAL_CAPACITY);
    assert!(map.neighborhood_size() <= MAX_NEIGHBORHOOD);
    assert_eq!(map.len(), 100);
    for i in 0..100u32 {
        assert_eq!(map.get(&i), Some(&(i * 3)));
    }
}

#[test]
fn double_remove_is_a_noop() {
    let mut map = HashMap::from([(1, "a"), (2, "b")]);
    assert_eq!(map.remove(&1), Some("a"));
    assert_eq!(map.remove(&1), None);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), None);
    assert_eq!(map.get(&2), Some(&"b"));
}

#[test]
fn iteration_follows_insertion_order() {
    let mut map = HashMap::new();
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let mut expected = Vec::new();
    while expected.len() < 500 {
        let key: u64 = rng.random();
        if map.insert(key, expected.len()) {
            expected.push(key);
        }
    }

    // Remove every fourth key and re-append a few.
    let removed: Vec<u64> = expected.iter().step_by(4).copied().collect();
    for key in &removed {
        assert!(map.remove(key).is_some());
    }
    expected.retain(|key| !removed.contains(key));
    for &key in removed.iter().take(10) {
        assert!(map.insert(key, 0));
        expected.push(key);
    }

    assert_eq!(map.keys().copied().collect::<Vec<_>>(), expected);
    assert_eq!(map.iter().len(), expected.len());
    assert_eq!(map.into_iter().map(|(k, _)| k).collect::<Vec<_>>(), expected);
}

#[test]
fn clear_then_reuse() {
    let mut map: HashMap<String, usize> = (0..40).map(|i| (format!("k{i}"), i)).collect();
    let buckets = map.capacity();

    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.capacity(), buckets);
    assert_eq!(map.iter().next(), None);
    assert!(!map.contains_key("k3"));

    assert!(map.insert("k3".to_string(), 3));
    assert_eq!(map.get("k3"), Some(&3));
    assert_eq!(map.len(), 1);
}

#[test]
fn clone_is_deep_and_independent() {
    let mut original: HashMap<u32, Vec<u32>> = HashMap::new();
    for i in 0..64 {
        original.insert(i, vec![i]);
    }

    let mut copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.capacity(), original.capacity());

    copy.get_mut(&0).unwrap().push(99);
    copy.remove(&1);
    copy.insert(1000, Vec::new());

    assert_eq!(original.get(&0), Some(&vec![0]));
    assert!(original.contains_key(&1));
    assert!(!original.contains_key(&1000));
    assert_ne!(copy, original);
}

#[test]
fn colliding_keys_remain_reachable() {
    let mut map = HashMap::with_hasher(ConstBuildHasher);
    for i in 0..300u32 {
        assert!(map.insert(i, i.to_string()));
        assert_load_bound(&map);
    }
    for i in 0..300u32 {
        assert_eq!(map.get(&i).map(String::as_str), Some(i.to_string().as_str()));
    }

    for i in (0..300u32).rev().step_by(2) {
        assert!(map.remove(&i).is_some());
    }
    for i in 0..300u32 {
        assert_eq!(map.contains_key(&i), i % 2 == 0);
    }

    // Re-inserting after overflow removals still finds a home.
    for i in (1..300u32).step_by(2) {
        assert!(map.insert(i, String::new()));
    }
    assert_eq!(map.len(), 300);
}

#[test]
fn entry_api_counts_words() {
    let text = "the quick brown fox jumps over the lazy dog the end";
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in text.split_whitespace() {
        *counts.entry(word).or_insert(0) += 1;
    }

    assert_eq!(counts[&"the"], 3);
    assert_eq!(counts[&"fox"], 1);
    assert_eq!(
        counts.keys().copied().take(3).collect::<Vec<_>>(),
        ["the", "quick", "brown"]
    );

    match counts.entry("the") {
        Entry::Occupied(entry) => assert_eq!(entry.remove(), 3),
        Entry::Vacant(_) => panic!("expected occupied entry"),
    }
    assert!(!counts.contains_key("the"));
}

#[test]
fn default_on_access_inserts_once() {
    let mut map: HashMap<u8, Vec<u8>> = HashMap::new();
    map.get_or_insert_default(7).push(1);
    map.get_or_insert_default(7).push(2);
    assert_eq!(map.len(), 1);
    assert_eq!(map[&7], [1, 2]);
}

#[test]
fn with_capacity_avoids_growth() {
    let mut map = HashMap::with_capacity(1000);
    let buckets = map.capacity();
    for i in 0..1000u64 {
        map.insert(i, ());
    }
    assert_eq!(map.capacity(), buckets);
    assert_load_bound(&map);
}

#[test]
fn extend_from_pairs_and_references() {
    let mut map = HashMap::new();
    map.extend((0..10).map(|i| (i, i * i)));
    let extra = [(100, 1), (5, 0)];
    map.extend(extra.iter().map(|(k, v)| (k, v)));

    assert_eq!(map.len(), 11);
    assert_eq!(map[&5], 25);
    assert_eq!(map[&100], 1);
}

#[test]
fn debug_formats_in_insertion_order() {
    let map = HashMap::from([("z", 1), ("a", 2)]);
    assert_eq!(format!("{map:?}"), r#"{"z": 1, "a": 2}"#);
}
