#![cfg(test)]

// Property tests for HashMap kept inside the crate so every step can assert
// the table's internal invariants.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::hash::Hasher;

use proptest::prelude::*;

use crate::error::Error;
use crate::hash_map::Entry;
use crate::hash_map::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, i32),
    EntryInsert(u16, i32),
    Remove(u16),
    Get(u16),
    At(u16),
    GetOrDefault(u16),
    Mutate(u16, i32),
    Reserve(u8),
    Clear,
    Iterate,
}

fn arb_op(key_space: u16) -> impl Strategy<Value = Op> {
    let key = 0..key_space;
    prop_oneof![
        6 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::EntryInsert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Get),
        1 => key.clone().prop_map(Op::At),
        1 => key.clone().prop_map(Op::GetOrDefault),
        1 => (key, any::<i32>()).prop_map(|(k, d)| Op::Mutate(k, d)),
        1 => any::<u8>().prop_map(Op::Reserve),
        1 => Just(Op::Clear),
        1 => Just(Op::Iterate),
    ]
}

/// Insertion-ordered reference model.
#[derive(Default)]
struct Model {
    pairs: Vec<(u16, i32)>,
}

impl Model {
    fn position(&self, key: u16) -> Option<usize> {
        self.pairs.iter().position(|&(k, _)| k == key)
    }

    fn get(&self, key: u16) -> Option<i32> {
        self.position(key).map(|i| self.pairs[i].1)
    }

    fn get_mut(&mut self, key: u16) -> Option<&mut i32> {
        let i = self.position(key)?;
        Some(&mut self.pairs[i].1)
    }

    fn insert(&mut self, key: u16, value: i32) -> bool {
        if self.position(key).is_some() {
            return false;
        }
        self.pairs.push((key, value));
        true
    }

    fn remove(&mut self, key: u16) -> Option<i32> {
        let i = self.position(key)?;
        Some(self.pairs.remove(i).1)
    }
}

fn run_ops<S: BuildHasher>(
    mut sut: HashMap<u16, i32, S>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model = Model::default();

    for op in ops {
        let buckets_before = sut.capacity();
        match op {
            Op::Insert(k, v) => {
                prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
            }
            Op::EntryInsert(k, v) => match sut.entry(k) {
                Entry::Occupied(mut entry) => {
                    prop_assert_eq!(Some(*entry.get()), model.get(k));
                    let old = entry.insert(v);
                    let slot = model.get_mut(k).expect("model tracks occupied key");
                    prop_assert_eq!(old, *slot);
                    *slot = v;
                }
                Entry::Vacant(entry) => {
                    prop_assert_eq!(model.get(k), None);
                    prop_assert_eq!(*entry.insert(v), v);
                    model.insert(k, v);
                }
            },
            Op::Remove(k) => {
                prop_assert_eq!(sut.remove(&k), model.remove(k));
                prop_assert!(!sut.contains_key(&k));
            }
            Op::Get(k) => {
                prop_assert_eq!(sut.get(&k).copied(), model.get(k));
                prop_assert_eq!(sut.contains_key(&k), model.get(k).is_some());
            }
            Op::At(k) => match model.get(k) {
                Some(v) => prop_assert_eq!(sut.at(&k), Ok(&v)),
                None => prop_assert_eq!(sut.at(&k), Err(Error::KeyNotFound)),
            },
            Op::GetOrDefault(k) => {
                model.insert(k, 0);
                prop_assert_eq!(Some(*sut.get_or_insert_default(k)), model.get(k));
            }
            Op::Mutate(k, d) => {
                if let Some(value) = sut.get_mut(&k) {
                    *value = value.wrapping_add(d);
                }
                if let Some(value) = model.get_mut(k) {
                    *value = value.wrapping_add(d);
                }
            }
            Op::Reserve(additional) => {
                sut.reserve(additional as usize);
                prop_assert!(sut.max_population() >= sut.len() + additional as usize);
            }
            Op::Clear => {
                sut.clear();
                model.pairs.clear();
                prop_assert_eq!(sut.capacity(), buckets_before);
            }
            Op::Iterate => {
                let pairs: Vec<_> = sut.iter().map(|(&k, &v)| (k, v)).collect();
                prop_assert_eq!(&pairs, &model.pairs);
            }
        }

        prop_assert!(sut.capacity() >= buckets_before, "capacity never shrinks");
        prop_assert_eq!(sut.len(), model.pairs.len());
        prop_assert_eq!(sut.is_empty(), model.pairs.is_empty());
        prop_assert!(sut.len() <= sut.max_population());
        sut.check_invariants();
    }

    let owned: Vec<_> = sut.into_iter().collect();
    prop_assert_eq!(owned, model.pairs);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn prop_matches_ordered_model(ops in proptest::collection::vec(arb_op(64), 1..200)) {
        run_ops(HashMap::with_hasher(RandomState::new()), ops)?;
    }

    #[test]
    fn prop_matches_ordered_model_presized(
        capacity in 0usize..100,
        ops in proptest::collection::vec(arb_op(512), 1..200),
    ) {
        run_ops(HashMap::with_capacity_and_hasher(capacity, RandomState::new()), ops)?;
    }
}

// Collision variants: every key shares one ideal bucket, or one of a handful,
// so most elements go through displacement or the overflow list.
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
        0
    }
}

#[derive(Clone, Default)]
struct CoarseBuildHasher;
struct CoarseHasher(u64);

impl BuildHasher for CoarseBuildHasher {
    type Hasher = CoarseHasher;

    fn build_hasher(&self) -> Self::Hasher {
        CoarseHasher(0)
    }
}

impl Hasher for CoarseHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_add(b as u64);
        }
    }

    fn finish(&self) -> u64 {
        self.0 % 4
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_total_collisions(ops in proptest::collection::vec(arb_op(48), 1..150)) {
        run_ops(HashMap::with_hasher(ConstBuildHasher), ops)?;
    }

    #[test]
    fn prop_clustered_hashes(ops in proptest::collection::vec(arb_op(96), 1..150)) {
        run_ops(HashMap::with_hasher(CoarseBuildHasher), ops)?;
    }

    #[test]
    fn prop_clone_matches_source(ops in proptest::collection::vec(arb_op(64), 1..100)) {
        let mut map = HashMap::with_hasher(RandomState::new());
        for op in ops {
            match op {
                Op::Insert(k, v) | Op::EntryInsert(k, v) => {
                    map.insert(k, v);
                }
                Op::Remove(k) => {
                    map.remove(&k);
                }
                _ => {}
            }
        }

        let copy = map.clone();
        copy.check_invariants();
        prop_assert_eq!(copy.capacity(), map.capacity());
        prop_assert_eq!(copy.neighborhood_size(), map.neighborhood_size());
        prop_assert!(copy.iter().eq(map.iter()));
        prop_assert!(copy == map);
    }
}
