use num_bigint::BigInt;

use super::InternCache;
use crate::value::{Repr, Value};

fn int(n: i64) -> Value {
    Value::new(Repr::Integer(BigInt::from(n)))
}

#[test]
fn hit_returns_first_instance() {
    let cache: InternCache<i64> = InternCache::new("test", 8);
    let a = cache.intern(5, || int(5));
    let b = cache.intern(5, || int(5));
    assert!(Value::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
}

#[test]
fn hit_skips_builder() {
    let cache: InternCache<i64> = InternCache::new("test", 8);
    cache.intern(1, || int(1));
    let again = cache.intern(1, || panic!("builder must not run on a hit"));
    assert_eq!(again.as_integer(), Some(&BigInt::from(1)));
}

#[test]
fn full_cache_stops_remembering() {
    let cache: InternCache<i64> = InternCache::new("test", 2);
    cache.intern(1, || int(1));
    cache.intern(2, || int(2));
    let a = cache.intern(3, || int(3));
    let b = cache.intern(3, || int(3));
    assert_eq!(cache.len(), 2);
    assert!(!Value::ptr_eq(&a, &b));
    assert!(a.same(&b));
    // Earlier entries still hit.
    let c = cache.intern(2, || int(2));
    let d = cache.intern(2, || int(2));
    assert!(Value::ptr_eq(&c, &d));
}

#[test]
fn concurrent_interning_agrees() {
    let cache: InternCache<i64> = InternCache::new("test", 1024);
    let results: Vec<Vec<Value>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| (0..64).map(|n| cache.intern(n, || int(n))).collect::<Vec<_>>()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(cache.len(), 64);
    for row in &results[1..] {
        for (a, b) in results[0].iter().zip(row) {
            assert!(Value::ptr_eq(a, b));
        }
    }
}
