use super::*;

/// A toy nested structure standing in for nested collection values.
enum Nest {
    Leaf(u64),
    Wrap(Box<Nest>),
}

fn build(depth: u64) -> Nest {
    let mut nest = Nest::Leaf(depth);
    for _ in 0..depth {
        nest = Nest::Wrap(Box::new(nest));
    }
    nest
}

fn leaf_of(nest: &Nest) -> u64 {
    ensure_sufficient_stack(|| match nest {
        Nest::Leaf(n) => *n,
        Nest::Wrap(inner) => leaf_of(inner),
    })
}

fn same_shape(a: &Nest, b: &Nest) -> bool {
    ensure_sufficient_stack(|| match (a, b) {
        (Nest::Leaf(x), Nest::Leaf(y)) => x == y,
        (Nest::Wrap(x), Nest::Wrap(y)) => same_shape(x, y),
        _ => false,
    })
}

fn dismantle(nest: Nest) {
    // Iterative drop so the test itself does not recurse in Drop.
    let mut current = nest;
    while let Nest::Wrap(inner) = current {
        current = *inner;
    }
}

#[test]
fn shallow_walk_returns_leaf() {
    let nest = build(10);
    assert_eq!(leaf_of(&nest), 10);
    dismantle(nest);
}

#[test]
fn deep_walk_does_not_overflow() {
    let nest = build(200_000);
    assert_eq!(leaf_of(&nest), 200_000);
    dismantle(nest);
}

#[test]
fn deep_pairwise_walk_does_not_overflow() {
    let a = build(150_000);
    let b = build(150_000);
    assert!(same_shape(&a, &b));
    dismantle(a);
    dismantle(b);
}

#[test]
fn passes_through_result_values() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("nope"));
    assert_eq!(result, Err("nope"));
}
