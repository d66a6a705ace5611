#![cfg(test)]

// Property tests for SortedHashTable kept inside the crate so they can call
// the internal consistency check after every operation.

use crate::key_index::{Djb2, Fnv1a, KeyIndex};
use crate::sorted_hash_table::{SortedHashTable, TableError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeMap;

// Pool-indexed operations so shrinking moves toward earlier keys and shorter
// op lists.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, String),
    Get(usize),
    Contains(String),
    Iterate,
    Dump,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (1usize..=8, proptest::collection::vec("[a-zA-Z]{0,5}", 1..=8)).prop_flat_map(
        |(size, pool)| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let op = prop_oneof![
                3 => (idx.clone(), "[a-z0-9]{0,4}").prop_map(|(i, v)| OpI::Set(i, v)),
                2 => idx.clone().prop_map(OpI::Get),
                1 => "[a-z]{0,5}".prop_map(OpI::Contains),
                1 => Just(OpI::Iterate),
                1 => Just(OpI::Dump),
            ];
            proptest::collection::vec(op, 1..60)
                .prop_map(move |ops| (size, pool.clone(), ops))
        },
    )
}

fn render<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let body: Vec<String> = pairs.map(|(k, v)| format!("'{}': '{}'", k, v)).collect();
    format!("{{{}}}", body.join(", "))
}

// State-machine equivalence against a BTreeMap model:
// - `set` succeeds exactly for non-empty keys; updates keep `len` fixed.
// - `get`/`contains_key` agree with the model; empty keys are never found.
// - `iter` walks the model's ascending order and `.rev()` its reverse.
// - Display output matches the model rendered in both directions.
// - Bucket chains and the sort list index the same entries after each op.
fn run_state_machine<H: KeyIndex>(
    mut sut: SortedHashTable<H>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<String, String> = BTreeMap::new();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = &pool[i];
                let before = sut.len();
                let existed = model.contains_key(k);
                match sut.set(k, &v) {
                    Ok(()) => {
                        prop_assert!(!k.is_empty(), "empty key must be rejected");
                        model.insert(k.clone(), v);
                        prop_assert_eq!(sut.len(), before + usize::from(!existed));
                    }
                    Err(TableError::EmptyKey) => {
                        prop_assert!(k.is_empty());
                        prop_assert_eq!(sut.len(), before);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k).map(String::as_str));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Iterate => {
                let fwd: Vec<(&str, &str)> = sut.iter().collect();
                let m: Vec<(&str, &str)> =
                    model.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                prop_assert_eq!(&fwd, &m);
                let mut back: Vec<(&str, &str)> = sut.iter().rev().collect();
                back.reverse();
                prop_assert_eq!(back, m);
            }
            OpI::Dump => {
                let m = model.iter().map(|(k, v)| (k.as_str(), v.as_str()));
                prop_assert_eq!(sut.to_string(), render(m.clone()));
                prop_assert_eq!(sut.display_rev().to_string(), render(m.rev()));
            }
        }

        sut.assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_djb2((size, pool, ops) in arb_scenario()) {
        let sut = SortedHashTable::with_key_index(size, Djb2).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_fnv1a((size, pool, ops) in arb_scenario()) {
        let sut = SortedHashTable::with_key_index(size, Fnv1a).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }

    // Worst case: every key lands in bucket zero, so every lookup walks the
    // full collision chain.
    #[test]
    fn prop_state_machine_with_collisions((size, pool, ops) in arb_scenario()) {
        let sut = SortedHashTable::with_key_index(size, |_: &[u8], _: usize| -> usize { 0 }).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}
