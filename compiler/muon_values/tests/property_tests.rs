//! Property-based tests for the value core.
//!
//! Values are described by a small `Sketch` tree, then built twice: once
//! directly and once through the lazy combinators (catenation, unions,
//! unscaled ratios) in a separate pool. Whatever the representation, the
//! two builds must be the same value with the same identity text.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use std::collections::BTreeMap;
use std::hash::BuildHasher;

use muon_values::{MemoryPool, Value};
use proptest::prelude::*;
use rustc_hash::FxBuildHasher;

#[derive(Clone, Debug)]
enum Sketch {
    Int(i64),
    Frac(i64, i64),
    Text(String),
    Array(Vec<Sketch>),
    Set(Vec<Sketch>),
    Bag(Vec<(Sketch, u64)>),
    Tuple(BTreeMap<String, Sketch>),
}

// -- Strategies --

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-c]{0,3}").expect("valid regex"),
        prop::collection::vec(any::<char>(), 1..3).prop_map(String::from_iter),
    ]
}

fn sketch_strategy() -> impl Strategy<Value = Sketch> {
    let leaf = prop_oneof![
        (-20i64..20).prop_map(Sketch::Int),
        (-20i64..20, 1i64..12).prop_map(|(n, d)| Sketch::Frac(n, d)),
        text_strategy().prop_map(Sketch::Text),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Sketch::Array),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Sketch::Set),
            prop::collection::vec((inner.clone(), 1u64..4), 0..4).prop_map(Sketch::Bag),
            prop::collection::btree_map("[a-c]", inner, 0..3).prop_map(Sketch::Tuple),
        ]
    })
}

fn bag_entries() -> impl Strategy<Value = Vec<(i64, u64)>> {
    prop::collection::vec((0i64..5, 1u64..4), 0..5)
}

// -- Builders --

/// The plainest construction of `sketch`.
fn build(pool: &MemoryPool, sketch: &Sketch) -> Value {
    match sketch {
        Sketch::Int(n) => pool.integer(*n),
        Sketch::Frac(n, d) => pool.fraction(*n, *d).unwrap(),
        Sketch::Text(t) => pool.text_from_str(t),
        Sketch::Array(ms) => pool.array(ms.iter().map(|m| build(pool, m)).collect()),
        Sketch::Set(ms) => pool.set(ms.iter().map(|m| build(pool, m)).collect()),
        Sketch::Bag(ms) => pool
            .bag(ms.iter().map(|(m, n)| (build(pool, m), *n)).collect())
            .unwrap(),
        Sketch::Tuple(attrs) => pool
            .tuple(attrs.iter().map(|(k, v)| (k.as_str(), build(pool, v))))
            .unwrap(),
    }
}

/// The same value through lazy combinators and unreduced forms.
fn rebuild(pool: &MemoryPool, sketch: &Sketch) -> Value {
    match sketch {
        Sketch::Int(n) => pool.integer(*n),
        Sketch::Frac(n, d) => pool.fraction(-3 * n, -3 * d).unwrap(),
        Sketch::Text(t) => pool.text(&t.encode_utf16().collect::<Vec<_>>()).unwrap(),
        Sketch::Array(ms) => ms.iter().fold(pool.array(Vec::new()), |acc, m| {
            let single = pool.array(vec![rebuild(pool, m)]);
            pool.catenate(&acc, &single).unwrap()
        }),
        Sketch::Set(ms) => ms.iter().rev().fold(pool.set(Vec::new()), |acc, m| {
            let single = pool.set(vec![rebuild(pool, m)]);
            pool.set_union(&single, &acc).unwrap()
        }),
        Sketch::Bag(ms) => {
            let mut acc = pool.bag(Vec::new()).unwrap();
            for (m, n) in ms.iter().rev() {
                for _ in 0..*n {
                    let single = pool.bag(vec![(rebuild(pool, m), 1)]).unwrap();
                    acc = pool.bag_union(&acc, &single).unwrap();
                }
            }
            acc
        }
        Sketch::Tuple(attrs) => pool
            .tuple(attrs.iter().rev().map(|(k, v)| (k.as_str(), rebuild(pool, v))))
            .unwrap(),
    }
}

fn hash_of(value: &Value) -> u64 {
    FxBuildHasher.hash_one(value)
}

fn integer_bag(pool: &MemoryPool, entries: &[(i64, u64)]) -> Value {
    pool.bag(entries.iter().map(|&(m, n)| (pool.integer(m), n)).collect())
        .unwrap()
}

// -- Properties --

proptest! {
    #[test]
    fn representation_does_not_matter(sketch in sketch_strategy()) {
        let (first, second) = (MemoryPool::new(), MemoryPool::new());
        let direct = build(&first, &sketch);
        let lazy = rebuild(&second, &sketch);
        prop_assert!(direct.same(&lazy));
        prop_assert!(lazy.same(&direct));
        prop_assert_eq!(direct.identity(), lazy.identity());
        prop_assert_eq!(hash_of(&direct), hash_of(&lazy));
    }

    #[test]
    fn same_is_reflexive_and_symmetric(x in sketch_strategy(), y in sketch_strategy()) {
        let pool = MemoryPool::new();
        let a = build(&pool, &x);
        let b = rebuild(&pool, &y);
        prop_assert!(a.same(&a.clone()));
        prop_assert_eq!(a.same(&b), b.same(&a));
    }

    #[test]
    fn same_agrees_with_identity(x in sketch_strategy(), y in sketch_strategy()) {
        let pool = MemoryPool::new();
        let a = rebuild(&pool, &x);
        let b = rebuild(&pool, &y);
        let equal = a.same(&b);
        prop_assert_eq!(equal, a.identity() == b.identity());
        if equal {
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
    }

    #[test]
    fn same_is_transitive(
        x in sketch_strategy(),
        y in sketch_strategy(),
        z in sketch_strategy(),
    ) {
        let pool = MemoryPool::new();
        let (a, b, c) = (build(&pool, &x), rebuild(&pool, &y), build(&pool, &z));
        if a.same(&b) && b.same(&c) {
            prop_assert!(a.same(&c));
        }
    }

    #[test]
    fn preview_leaves_values_unchanged(sketch in sketch_strategy()) {
        let pool = MemoryPool::new();
        let lazy = rebuild(&pool, &sketch);
        let before = lazy.preview();
        prop_assert_eq!(lazy.preview(), before);
        prop_assert!(lazy.same(&build(&pool, &sketch)));
    }

    #[test]
    fn catenation_indexes_like_a_flat_array(
        members in prop::collection::vec(-50i64..50, 0..40),
        chunk in 1usize..6,
    ) {
        let pool = MemoryPool::new();
        let flat = pool.array(members.iter().map(|&n| pool.integer(n)).collect());
        let joined = members.chunks(chunk).fold(pool.array(Vec::new()), |acc, part| {
            let piece = pool.array(part.iter().map(|&n| pool.integer(n)).collect());
            pool.catenate(&acc, &piece).unwrap()
        });
        let tree = joined.as_array().unwrap();
        prop_assert_eq!(tree.count(), members.len() as u64);
        for (i, &n) in members.iter().enumerate() {
            let at = tree.maybe_at(i as u64).map(Value::export);
            prop_assert_eq!(at, Some(n.to_string()));
        }
        prop_assert!(tree.maybe_at(members.len() as u64).is_none());
        prop_assert!(joined.same(&flat));
    }

    #[test]
    fn bag_union_commutes_and_associates(
        xs in bag_entries(),
        ys in bag_entries(),
        zs in bag_entries(),
    ) {
        let pool = MemoryPool::new();
        let (a, b, c) = (
            integer_bag(&pool, &xs),
            integer_bag(&pool, &ys),
            integer_bag(&pool, &zs),
        );
        let ab = pool.bag_union(&a, &b).unwrap();
        let ba = pool.bag_union(&b, &a).unwrap();
        prop_assert!(ab.same(&ba));

        let left = pool.bag_union(&ab, &c).unwrap();
        let bc = pool.bag_union(&b, &c).unwrap();
        let right = pool.bag_union(&a, &bc).unwrap();
        prop_assert!(left.same(&right));

        let total: u64 = xs.iter().chain(&ys).chain(&zs).map(|&(_, n)| n).sum();
        prop_assert_eq!(left.as_bag().unwrap().count(), total);
        for probe in 0i64..5 {
            let expected: u64 = xs
                .iter()
                .chain(&ys)
                .chain(&zs)
                .filter(|&&(m, _)| m == probe)
                .map(|&(_, n)| n)
                .sum();
            let tree = left.as_bag().unwrap();
            prop_assert_eq!(tree.multiplicity_of(&pool.integer(probe)), expected);
        }
    }

    #[test]
    fn unique_forces_multiplicity_one(entries in bag_entries()) {
        let pool = MemoryPool::new();
        let set = pool.unique(&integer_bag(&pool, &entries)).unwrap();
        let tree = set.as_set().unwrap();
        let mut distinct: Vec<i64> = entries.iter().map(|&(m, _)| m).collect();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(tree.count(), distinct.len() as u64);
        prop_assert!(tree.members().iter().all(|(_, n)| *n == 1));
    }

    #[test]
    fn scaled_fractions_are_the_same(
        n in -10_000i64..10_000,
        d in 1i64..10_000,
        k in 1i64..1_000,
    ) {
        let pool = MemoryPool::new();
        let base = pool.fraction(n, d).unwrap();
        let scaled = pool.fraction(n * k, d * k).unwrap();
        let flipped = pool.fraction(-n, -d).unwrap();
        prop_assert!(base.same(&scaled));
        prop_assert!(base.same(&flipped));
        prop_assert_eq!(base.export(), scaled.export());
    }

    #[test]
    fn text_counts_code_points(s in any::<String>()) {
        let pool = MemoryPool::new();
        let units: Vec<u16> = s.encode_utf16().collect();
        let value = pool.text(&units).unwrap();
        let text = value.as_text().unwrap();
        prop_assert_eq!(text.count(), s.chars().count());
        prop_assert_eq!(text.has_non_bmp(), s.chars().any(|c| c.len_utf16() == 2));
        for (i, c) in s.chars().enumerate() {
            prop_assert_eq!(text.code_point_at(i), Some(u32::from(c)));
        }
        prop_assert_eq!(text.code_point_at(s.chars().count()), None);
        prop_assert_eq!(text.to_rust_string(), s);
    }

    #[test]
    fn text_validation_matches_std(
        units in prop::collection::vec(prop_oneof![any::<u16>(), 0xD7F0u16..0xE010], 0..12),
    ) {
        let pool = MemoryPool::new();
        let well_formed = char::decode_utf16(units.iter().copied()).all(|r| r.is_ok());
        prop_assert_eq!(pool.text(&units).is_ok(), well_formed);
    }
}
