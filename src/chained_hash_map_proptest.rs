#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// chain placement through `assert_chains`.

use crate::chained_hash_map::{ChainedHashMap, PutResult, Removed};
use crate::growth::Growth;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutNoalloc(usize, i32),
    PutIdent(usize),
    PutIdentNoalloc(usize),
    Remove(usize),
    RemoveNofree(usize),
    Get(usize),
    Clear,
    SetLoadFactor(u8),
    Rehash,
}

// Model value: `None` marks an identity entry (value == key).
type Model = HashMap<String, Option<String>>;

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-d]{0,3}", 1..=10).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::PutNoalloc(i, v)),
            2 => idx.clone().prop_map(OpI::PutIdent),
            1 => idx.clone().prop_map(OpI::PutIdentNoalloc),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::RemoveNofree),
            3 => idx.clone().prop_map(OpI::Get),
            1 => Just(OpI::Clear),
            1 => (1u8..=8).prop_map(OpI::SetLoadFactor),
            1 => Just(OpI::Rehash),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn arb_growth() -> impl Strategy<Value = Growth> {
    prop_oneof![
        (1usize..=5).prop_map(Growth::Additive),
        (2usize..=4).prop_map(Growth::Multiplicative),
        Just(Growth::Fixed),
    ]
}

// A weak hash so chains actually collide.
fn short_hash(s: &str) -> u64 {
    s.bytes().map(u64::from).sum::<u64>() % 7
}

fn other_hash(s: &str) -> u64 {
    s.bytes().fold(17u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

fn same(a: &str, b: &str) -> bool {
    a == b
}

type Map = ChainedHashMap<String, String, fn(&str) -> u64, fn(&str, &str) -> bool>;

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `get` returns the most recently put value; identity entries return the key.
// - `len()` equals the number of distinct live keys, across every resize.
// - Every entry sits exactly once in chain `hash % capacity`.
// - Capacity never shrinks, and `clear` keeps it.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), cap in 0usize..6, growth in arb_growth()) {
        let mut sut: Map = ChainedHashMap::with_strategies(
            cap,
            growth,
            short_hash as fn(&str) -> u64,
            same as fn(&str, &str) -> bool,
        ).unwrap();
        let mut model: Model = HashMap::new();
        let mut alt_hash = false;

        for op in ops {
            let cap_before = sut.capacity();
            match op {
                OpI::Put(i, v) => {
                    let k = &pool[i];
                    let v = v.to_string();
                    let r = sut.put(k.as_str(), v.as_str()).unwrap();
                    let expect = if model.insert(k.clone(), Some(v)).is_some() {
                        PutResult::Updated
                    } else {
                        PutResult::Inserted
                    };
                    prop_assert_eq!(r, expect);
                }
                OpI::PutNoalloc(i, v) => {
                    let k = pool[i].clone();
                    let v = v.to_string();
                    let r = sut.put_noalloc::<str>(k.clone(), v.clone()).unwrap();
                    let expect = if model.insert(k, Some(v)).is_some() {
                        PutResult::Updated
                    } else {
                        PutResult::Inserted
                    };
                    prop_assert_eq!(r, expect);
                }
                OpI::PutIdent(i) => {
                    let k = &pool[i];
                    let r = sut.put_ident(k.as_str()).unwrap();
                    let expect = if model.insert(k.clone(), None).is_some() {
                        PutResult::Updated
                    } else {
                        PutResult::Inserted
                    };
                    prop_assert_eq!(r, expect);
                }
                OpI::PutIdentNoalloc(i) => {
                    let k = pool[i].clone();
                    let r = sut.put_ident_noalloc::<str>(k.clone()).unwrap();
                    let expect = if model.insert(k, None).is_some() {
                        PutResult::Updated
                    } else {
                        PutResult::Inserted
                    };
                    prop_assert_eq!(r, expect);
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.remove(k.as_str()), model.remove(k).is_some());
                }
                OpI::RemoveNofree(i) => {
                    let k = &pool[i];
                    match (sut.remove_nofree(k.as_str()), model.remove(k)) {
                        (None, None) => {}
                        (Some(Removed::Pair { key, value }), Some(Some(mv))) => {
                            prop_assert_eq!(&key, k);
                            prop_assert_eq!(value, mv);
                        }
                        (Some(Removed::Identity(key)), Some(None)) => {
                            prop_assert_eq!(&key, k);
                        }
                        (got, want) => {
                            prop_assert!(false, "mismatch: {:?} vs {:?}", got, want);
                        }
                    }
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    let want = model.get(k).map(|v| v.clone().unwrap_or_else(|| k.clone()));
                    prop_assert_eq!(sut.get(k.as_str()).cloned(), want);
                    if let Some(None) = model.get(k) {
                        let (sk, sv) = sut.get_key_value(k.as_str()).unwrap();
                        prop_assert!(core::ptr::eq(sk, sv), "identity entry must alias its key");
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
                OpI::SetLoadFactor(q) => {
                    sut.set_load_factor(f32::from(q) * 0.25);
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
                OpI::Rehash => {
                    alt_hash = !alt_hash;
                    let h: fn(&str) -> u64 = if alt_hash { other_hash } else { short_hash };
                    sut.set_hash_fn::<str>(h);
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
            }

            prop_assert!(sut.capacity() >= cap_before, "capacity never shrinks");
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            sut.assert_chains();
        }

        // Final sweep: everything in the model is retrievable with its value.
        for (k, v) in &model {
            let want = v.clone().unwrap_or_else(|| k.clone());
            prop_assert_eq!(sut.get(k.as_str()), Some(&want));
        }
        prop_assert_eq!(sut.iter().count(), model.len());
    }
}

// Property: growth preserves every entry and `len()`; a fixed map never grows.
proptest! {
    #[test]
    fn prop_growth_preserves_entries(n in 0usize..200, cap in 1usize..8, growth in arb_growth()) {
        let mut sut: ChainedHashMap<u32, u32> =
            ChainedHashMap::with_capacity_and_growth(cap, growth).unwrap();
        for i in 0..n as u32 {
            let before = sut.len();
            prop_assert_eq!(sut.put_noalloc::<u32>(i, i * 3), Ok(PutResult::Inserted));
            prop_assert_eq!(sut.len(), before + 1);
        }
        for i in 0..n as u32 {
            prop_assert_eq!(sut.get(&i), Some(&(i * 3)));
        }
        if growth == Growth::Fixed {
            prop_assert_eq!(sut.capacity(), cap);
        }
        sut.assert_chains();
    }
}
