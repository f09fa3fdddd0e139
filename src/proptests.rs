use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Small key domain so that removals and duplicates hit often.
#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0i64..48")] i64, u32),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0i64..48")] i64),
    #[proptest(weight = 2)]
    Search(#[proptest(strategy = "0i64..48")] i64),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=600)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_overwrite_matches_btreemap(ops in ops_strategy()) {
        let config = Config::default().with_duplicates(DuplicatePolicy::Overwrite);
        let mut t: Subtree<i64, u32> = Subtree::with_config(&config);
        let mut m: BTreeMap<i64, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(t.insert(key, value), Ok(m.insert(key, value)));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::Search(key) => {
                    prop_assert_eq!(t.search(&key).copied(), m.get(&key).copied());
                }
            }
            prop_assert_eq!(t.len(), m.len());
            t.validate();
        }

        let mut got: Vec<(i64, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        got.sort_unstable();
        let expected: Vec<(i64, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_shadow_behaves_as_multiset(ops in ops_strategy()) {
        let mut t: Subtree<i64, u32> = Subtree::new();
        // Every payload stored under each key, duplicates included.
        let mut m: BTreeMap<i64, Vec<u32>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(t.insert(key, value), Ok(None));
                    m.entry(key).or_default().push(value);
                }
                Op::Remove(key) => match t.remove(&key) {
                    Some(value) => {
                        let stored = m.get_mut(&key).expect("removed key must be modeled");
                        let at = stored.iter().position(|v| *v == value);
                        prop_assert!(at.is_some(), "removed payload was never stored");
                        stored.swap_remove(at.unwrap());
                        if stored.is_empty() {
                            m.remove(&key);
                        }
                    }
                    None => prop_assert!(!m.contains_key(&key)),
                },
                Op::Search(key) => match t.search(&key) {
                    Some(value) => prop_assert!(m.get(&key).is_some_and(|vs| vs.contains(value))),
                    None => prop_assert!(!m.contains_key(&key)),
                },
            }
            prop_assert_eq!(t.len(), m.values().map(Vec::len).sum::<usize>());
            t.validate();
        }

        prop_assert_eq!(t.traverse().unwrap().len(), t.len());
    }

    #[test]
    fn prop_categories_are_isolated(
        signed in prop::collection::vec(any::<i64>(), 0..64),
        strings in prop::collection::vec("[a-z]{0,6}", 0..64),
    ) {
        let mut t: CategoryTree<usize> = CategoryTree::new();
        for (i, k) in signed.iter().enumerate() {
            t.insert(*k, i).unwrap();
        }
        let before: Vec<(KeyRef<'_>, usize)> = t
            .traverse(Category::Signed)
            .unwrap()
            .into_iter()
            .map(|(k, v)| (k, *v))
            .collect();

        let mut t2 = t.clone();
        for (i, k) in strings.iter().enumerate() {
            t2.insert(k.as_str(), i).unwrap();
        }
        for k in strings.iter().take(strings.len() / 2) {
            t2.remove(k.as_str());
        }

        let after: Vec<(KeyRef<'_>, usize)> = t2
            .traverse(Category::Signed)
            .unwrap()
            .into_iter()
            .map(|(k, v)| (k, *v))
            .collect();
        prop_assert_eq!(before, after);
        prop_assert!(t2.traverse(Category::Unsigned).unwrap().is_empty());
        prop_assert!(t2.traverse(Category::Float).unwrap().is_empty());
    }

    #[test]
    fn prop_remove_then_search(keys in prop::collection::vec(-1000i64..1000, 1..200)) {
        let mut t: Subtree<i64, usize> = Subtree::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(*k, i).unwrap();
        }
        for k in &keys {
            let copies = keys.iter().filter(|x| *x == k).count();
            let present_before = t.contains_key(k);
            let removed = t.remove(k);
            prop_assert_eq!(removed.is_some(), present_before);
            t.validate();
            if copies == 1 {
                prop_assert_eq!(t.search(k), None);
            }
        }
        prop_assert!(t.is_empty());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<&str> = vec!["a", "b", "c", "aa", "ab", "ba"];

    for_each_permutation(&keys, |perm| {
        let mut t: Subtree<Box<str>, usize> = Subtree::new();
        for (i, k) in perm.iter().enumerate() {
            assert_eq!(t.insert((*k).into(), i), Ok(None));
        }
        t.validate();
        for (i, k) in perm.iter().enumerate() {
            assert_eq!(t.search(*k), Some(&i));
        }

        // Remove in insertion order, then in reverse, from two copies.
        let mut forward = t.clone();
        for (i, k) in perm.iter().enumerate() {
            assert_eq!(forward.remove(*k), Some(i));
            forward.validate();
        }
        assert!(forward.is_empty());

        for (i, k) in perm.iter().enumerate().rev() {
            assert_eq!(t.remove(*k), Some(i));
            t.validate();
            for (j, other) in perm.iter().enumerate().take(i) {
                assert_eq!(t.search(*other), Some(&j));
            }
        }
        assert!(t.is_empty());
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<i64> = vec![40, 20, 60, 10, 30, 50, 70];

    // Insert in a fixed order (a full tree), then remove in all permutations.
    let mut base: Subtree<i64, i64> = Subtree::new();
    for k in &keys {
        base.insert(*k, -k).unwrap();
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for (n, k) in perm.iter().enumerate() {
            assert_eq!(t.remove(k), Some(-k));
            assert_eq!(t.len(), keys.len() - n - 1);
            t.validate();
            for rest in &perm[n + 1..] {
                assert_eq!(t.search(rest), Some(&-rest));
            }
        }
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
    });
}
