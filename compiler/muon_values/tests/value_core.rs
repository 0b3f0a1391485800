//! End-to-end checks of the public value API.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::mutable_key_type,
    reason = "identity caches never change what a value hashes to"
)]

use std::collections::HashSet;
use std::sync::Arc;

use muon_values::{BaseKind, FixedDecimal, MemoryPool, PoolConfig, Value, ValueError};
use pretty_assertions::assert_eq;

fn ints(pool: &MemoryPool, ns: &[i64]) -> Value {
    pool.array(ns.iter().map(|&n| pool.integer(n)).collect())
}

#[test]
fn catenation_is_indistinguishable_from_a_flat_array() {
    let pool = MemoryPool::new();
    let one_two = pool.catenate(&ints(&pool, &[1]), &ints(&pool, &[2])).unwrap();
    let lazy = pool.catenate(&one_two, &ints(&pool, &[3])).unwrap();
    let flat = ints(&pool, &[1, 2, 3]);

    assert!(lazy.same(&flat));
    assert_eq!(lazy, flat);
    let tree = lazy.as_array().unwrap();
    assert_eq!(tree.count(), 3);
    let at: Vec<_> = (0..4).map(|i| tree.maybe_at(i).map(Value::export)).collect();
    assert_eq!(
        at,
        vec![
            Some("1".to_string()),
            Some("2".to_string()),
            Some("3".to_string()),
            None
        ]
    );
}

#[test]
fn empty_operands_are_absorbed() {
    let pool = MemoryPool::new();
    let array = ints(&pool, &[4, 5]);
    let no_array = pool.array(Vec::new());
    assert!(pool.catenate(&array, &no_array).unwrap().same(&array));
    assert!(pool.catenate(&no_array, &array).unwrap().same(&array));

    let bag = pool.bag(vec![(pool.integer(1), 2)]).unwrap();
    let no_bag = pool.bag(Vec::new()).unwrap();
    assert!(pool.bag_union(&no_bag, &bag).unwrap().same(&bag));

    let set = pool.set(vec![pool.integer(1)]);
    let no_set = pool.set(Vec::new());
    assert!(pool.set_union(&set, &no_set).unwrap().same(&set));
}

#[test]
fn bag_multiplicities_add() {
    let pool = MemoryPool::new();
    let x = pool.text_from_str("x");
    let two = pool.bag(vec![(x.clone(), 2)]).unwrap();
    let three = pool.bag(vec![(x.clone(), 3)]).unwrap();
    let sum = pool.bag_union(&two, &three).unwrap();
    let indexed = sum.as_bag().unwrap().collapse(true);
    assert_eq!(indexed.members(), vec![(x.clone(), 5)]);
    assert_eq!(sum.export(), "(Bag:[x : 5])");
}

#[test]
fn unique_keeps_one_of_each() {
    let pool = MemoryPool::new();
    let (x, y) = (pool.text_from_str("x"), pool.text_from_str("y"));
    let bag = pool.bag(vec![(x.clone(), 1), (x, 1), (y, 1)]).unwrap();
    let set = pool.unique(&bag).unwrap();
    let tree = set.as_set().unwrap();
    assert_eq!(tree.count(), 2);
    assert!(tree.members().iter().all(|(_, n)| *n == 1));
}

#[test]
fn fractions_normalize() {
    let pool = MemoryPool::new();
    assert!(pool.fraction(2, 4).unwrap().same(&pool.fraction(1, 2).unwrap()));
    let third = pool.fraction(1, 3).unwrap();
    assert!(!third.as_fraction().unwrap().is_terminating_decimal());
    assert_eq!(third.export(), "1/3");
    assert_eq!(pool.fraction(1, 4).unwrap().export(), "0.25");
    assert!(pool
        .fraction(0, 5)
        .unwrap()
        .same(&pool.default_of(BaseKind::Fraction).unwrap()));

    let decimal = pool.fraction_decimal(FixedDecimal::parse("-12.50").unwrap());
    assert!(decimal.same(&pool.fraction(-25, 2).unwrap()));
    assert_eq!(decimal.export(), "-12.5");
}

#[test]
fn non_bmp_text_counts_once() {
    let pool = MemoryPool::new();
    let value = pool.text(&[0xD83D, 0xDE00]).unwrap();
    let text = value.as_text().unwrap();
    assert_eq!(text.count(), 1);
    assert_eq!(text.code_point_at(0), Some(0x1F600));
    assert!(matches!(
        pool.text(&[0xDE00]),
        Err(ValueError::MalformedText(_))
    ));
}

#[test]
fn identity_is_deterministic_across_pools() {
    let (first, second) = (MemoryPool::new(), MemoryPool::new());
    let build = |pool: &MemoryPool| {
        pool.tuple([
            ("name", pool.text_from_str("widget")),
            (
                "tags",
                pool.set(vec![pool.text_from_str("b"), pool.text_from_str("a")]),
            ),
        ])
        .unwrap()
    };
    let (a, b) = (build(&first), build(&second));
    assert_eq!(a.identity(), b.identity());
    assert_eq!(
        a.export(),
        "(Tuple:{name : widget, tags : (Set:[a, b])})"
    );
}

#[test]
fn relations_need_one_heading() {
    let pool = MemoryPool::new();
    let ab = pool
        .tuple([("a", pool.integer(1)), ("b", pool.integer(2))])
        .unwrap();
    let ac = pool
        .tuple([("a", pool.integer(1)), ("c", pool.integer(2))])
        .unwrap();
    let mixed = pool.relation(pool.set(vec![ab.clone(), ac]));
    assert!(matches!(mixed, Err(ValueError::HeadingMismatch { .. })));
    assert!(matches!(
        pool.relation(pool.set(Vec::new())),
        Err(ValueError::NoHeadingInferable { .. })
    ));

    let heading = pool.heading(["a", "b"]);
    let empty = pool
        .relation_with_heading(&heading, pool.set(Vec::new()))
        .unwrap();
    assert_eq!(empty.kind(), BaseKind::Relation);
    let full = pool.relation(pool.set(vec![ab])).unwrap();
    assert!(!full.same(&empty));
}

#[test]
fn handles_are_never_the_same() {
    let pool = MemoryPool::new();
    let a = pool.new_variable(pool.integer(1));
    let b = pool.new_variable(pool.integer(1));
    assert!(!a.same(&b));
    assert!(a.same(&a));
    assert_eq!(a.export(), b.export());
    assert_ne!(a.identity(), b.identity());

    let p = pool.new_process();
    let s = pool.new_stream();
    let e = pool.new_external(Arc::new(3u8));
    assert_eq!(p.export(), "(Process:<opaque>)");
    assert_eq!(s.kind(), BaseKind::Stream);
    assert!(!e.same(&pool.new_external(Arc::new(3u8))));
}

#[test]
fn handles_from_separate_pools_stay_distinct() {
    let (first, second) = (MemoryPool::new(), MemoryPool::new());
    let a = first.new_variable(first.integer(1));
    let b = second.new_variable(second.integer(1));
    assert!(!a.same(&b));
    assert_ne!(a.identity(), b.identity());
    assert!(!first.new_process().same(&second.new_process()));
    assert!(!first.new_stream().same(&second.new_stream()));

    let both = first.set(vec![a.clone(), b]);
    assert_eq!(both.as_set().unwrap().count(), 2);
    let mut seen = HashSet::new();
    seen.insert(a);
    seen.insert(second.new_variable(second.integer(2)));
    assert_eq!(seen.len(), 2);
}

#[test]
fn values_key_hash_sets_by_equality() {
    let pool = MemoryPool::new();
    let mut seen = HashSet::new();
    seen.insert(pool.fraction(1, 2).unwrap());
    seen.insert(pool.fraction(2, 4).unwrap());
    seen.insert(pool.fraction_decimal(FixedDecimal::parse("0.5").unwrap()));
    seen.insert(ints(&pool, &[1, 2]));
    seen.insert(
        pool.catenate(&ints(&pool, &[1]), &ints(&pool, &[2]))
            .unwrap(),
    );
    assert_eq!(seen.len(), 2);
}

#[test]
fn pools_share_across_threads() {
    let pool = MemoryPool::with_config(PoolConfig::default().cache_capacity(64));
    let values: Vec<Value> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| pool.text_from_str("shared")))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(values.windows(2).all(|w| w[0].same(&w[1])));
}

#[test]
fn init_tracing_is_idempotent() {
    muon_values::init_tracing();
    muon_values::init_tracing();
}
