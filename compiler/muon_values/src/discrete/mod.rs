//! Symbolic collection trees shared by Array, Set and Bag.
//!
//! A tree node either holds members directly (a *terminal* shape) or
//! describes an operation over child nodes: catenation for arrays,
//! multiset union and de-duplication for bags and sets. Symbolic nodes make
//! combination O(1); the flattening cost is paid on first demand by
//! `collapse` and memoized on the node.
//!
//! # Metadata
//!
//! Every node memoizes its member count, whether all members are distinct,
//! whether it is relational, and its collapsed terminal and indexed forms.
//! Terminal nodes never cache themselves, so trees hold no reference
//! cycles. `None` nodes are built with all metadata already known.
//!
//! # Recursion
//!
//! Incrementally built collections produce long chains of symbolic nodes.
//! Collapse flattens chains with an explicit stack; the remaining
//! structural recursions run under `ensure_sufficient_stack`, and `Drop`
//! dismantles chains iteratively.

#![allow(
    clippy::mutable_key_type,
    reason = "Value memoizes its identity text; Hash reads only the settled text"
)]

use std::fmt;
use std::sync::OnceLock;

use muon_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::value::{Heap, Heading, Value};

/// Whether member order is significant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// Arrays.
    Ordered,
    /// Sets and bags.
    Unordered,
}

/// One node of a collection tree.
#[derive(Debug)]
pub enum Shape {
    /// Zero members.
    None,
    /// `multiplicity` copies of one member; `multiplicity >= 1`.
    Singular { member: Value, multiplicity: u64 },
    /// Two or more members in order (arrays).
    Arrayed(Box<[Value]>),
    /// Two or more members with multiplicities (sets and bags). The same
    /// member may appear in several entries.
    ArrayedCounted(Box<[(Value, u64)]>),
    /// Distinct members keyed by value, with multiplicities. Only produced
    /// by collapse.
    Indexed(FxHashMap<Value, u64>),
    /// Members of the left child followed by those of the right (arrays).
    Catenated(Discrete, Discrete),
    /// Members of the child, each multiplicity forced to 1.
    Unique(Discrete),
    /// Multiset union: per-member multiplicities added.
    Summed(Discrete, Discrete),
}

impl Shape {
    fn is_symbolic(&self) -> bool {
        matches!(
            self,
            Shape::Catenated(..) | Shape::Unique(_) | Shape::Summed(..)
        )
    }
}

#[derive(Default)]
struct Meta {
    count: OnceLock<u64>,
    unique: OnceLock<bool>,
    relational: OnceLock<bool>,
    terminal: OnceLock<Discrete>,
    indexed: OnceLock<Discrete>,
}

struct Node {
    flavor: Flavor,
    shape: Shape,
    meta: Meta,
}

/// Shared handle to a collection tree.
#[derive(Clone)]
pub struct Discrete(Heap<Node>);

impl Discrete {
    fn from_shape(flavor: Flavor, shape: Shape) -> Self {
        Discrete(Heap::new(Node {
            flavor,
            shape,
            meta: Meta::default(),
        }))
    }

    pub(crate) fn empty(flavor: Flavor) -> Self {
        Discrete(Heap::new(Node {
            flavor,
            shape: Shape::None,
            meta: Meta {
                count: OnceLock::from(0),
                unique: OnceLock::from(true),
                relational: OnceLock::from(true),
                ..Meta::default()
            },
        }))
    }

    pub(crate) fn singular(flavor: Flavor, member: Value, multiplicity: u64) -> Self {
        debug_assert!(multiplicity >= 1);
        Discrete::from_shape(
            flavor,
            Shape::Singular {
                member,
                multiplicity,
            },
        )
    }

    /// Array members in order.
    pub(crate) fn arrayed(members: Vec<Value>) -> Self {
        match members.len() {
            0 => Discrete::empty(Flavor::Ordered),
            1 => {
                let mut members = members;
                match members.pop() {
                    Some(member) => Discrete::singular(Flavor::Ordered, member, 1),
                    None => Discrete::empty(Flavor::Ordered),
                }
            }
            _ => Discrete::from_shape(Flavor::Ordered, Shape::Arrayed(members.into())),
        }
    }

    /// Set or bag members with multiplicities; every count must be non-zero.
    pub(crate) fn counted(members: Vec<(Value, u64)>) -> Self {
        debug_assert!(members.iter().all(|(_, n)| *n > 0));
        if members.len() <= 1 {
            let mut members = members;
            return match members.pop() {
                Some((member, n)) => Discrete::singular(Flavor::Unordered, member, n),
                None => Discrete::empty(Flavor::Unordered),
            };
        }
        Discrete::from_shape(Flavor::Unordered, Shape::ArrayedCounted(members.into()))
    }

    pub(crate) fn catenated(left: Discrete, right: Discrete) -> Self {
        debug_assert!(left.flavor() == Flavor::Ordered && right.flavor() == Flavor::Ordered);
        Discrete::from_shape(Flavor::Ordered, Shape::Catenated(left, right))
    }

    pub(crate) fn summed(left: Discrete, right: Discrete) -> Self {
        debug_assert!(left.flavor() == Flavor::Unordered && right.flavor() == Flavor::Unordered);
        Discrete::from_shape(Flavor::Unordered, Shape::Summed(left, right))
    }

    pub(crate) fn unique(child: Discrete) -> Self {
        debug_assert!(child.flavor() == Flavor::Unordered);
        Discrete::from_shape(Flavor::Unordered, Shape::Unique(child))
    }

    #[inline]
    pub(crate) fn ptr_eq(a: &Discrete, b: &Discrete) -> bool {
        Heap::ptr_eq(&a.0, &b.0)
    }

    pub fn flavor(&self) -> Flavor {
        self.0.flavor
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }

    /// Whether this node is the `None` shape.
    pub fn is_none(&self) -> bool {
        matches!(self.0.shape, Shape::None)
    }

    /// Whether this node holds its members directly.
    pub fn is_terminal(&self) -> bool {
        !self.0.shape.is_symbolic()
    }

    /// Total number of members, counting multiplicity. Saturates at
    /// `u64::MAX`.
    pub fn count(&self) -> u64 {
        *self.0.meta.count.get_or_init(|| {
            ensure_sufficient_stack(|| match &self.0.shape {
                Shape::None => 0,
                Shape::Singular { multiplicity, .. } => *multiplicity,
                Shape::Arrayed(members) => u64::try_from(members.len()).unwrap_or(u64::MAX),
                Shape::ArrayedCounted(members) => members
                    .iter()
                    .fold(0u64, |total, (_, n)| total.saturating_add(*n)),
                Shape::Indexed(map) => map
                    .values()
                    .fold(0u64, |total, n| total.saturating_add(*n)),
                Shape::Catenated(left, right) | Shape::Summed(left, right) => {
                    left.count().saturating_add(right.count())
                }
                Shape::Unique(child) => child.distinct_count(),
            })
        })
    }

    /// Number of distinct members.
    pub fn distinct_count(&self) -> u64 {
        let indexed = self.indexed_form();
        match indexed.shape() {
            Shape::None => 0,
            Shape::Indexed(map) => u64::try_from(map.len()).unwrap_or(u64::MAX),
            other => unreachable!("indexed form has shape {other:?}"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.0.shape {
            Shape::None => true,
            Shape::Singular { .. }
            | Shape::Arrayed(_)
            | Shape::ArrayedCounted(_)
            | Shape::Indexed(_) => false,
            Shape::Catenated(..) | Shape::Summed(..) => self.count() == 0,
            Shape::Unique(child) => child.is_empty(),
        }
    }

    /// The member at zero-based `ordinal` of an array, or `None` past the
    /// end. Always `None` for set and bag trees.
    pub fn maybe_at(&self, ordinal: u64) -> Option<&Value> {
        if self.flavor() == Flavor::Unordered {
            return None;
        }
        let mut node = self;
        let mut ordinal = ordinal;
        loop {
            if let Some(terminal) = node.0.meta.terminal.get() {
                node = terminal;
            }
            match &node.0.shape {
                Shape::None => return None,
                Shape::Singular {
                    member,
                    multiplicity,
                } => return (ordinal < *multiplicity).then_some(member),
                Shape::Arrayed(members) => {
                    return usize::try_from(ordinal).ok().and_then(|i| members.get(i));
                }
                Shape::Catenated(left, right) => {
                    let consumed = left.count();
                    if ordinal < consumed {
                        node = left;
                    } else {
                        ordinal -= consumed;
                        node = right;
                    }
                }
                other => unreachable!("array tree holds {other:?}"),
            }
        }
    }

    /// Normalize to a terminal shape; with `want_indexed`, to `Indexed`
    /// (or `None`).
    ///
    /// Empty operands of a combination are dropped without touching the
    /// other side, and a combination of two empty sides collapses to `None`.
    pub fn collapse(&self, want_indexed: bool) -> Discrete {
        if want_indexed {
            self.indexed_form()
        } else {
            self.terminal_form()
        }
    }

    /// Memoized terminal form; terminal nodes are their own.
    pub fn terminal_form(&self) -> Discrete {
        if self.is_terminal() {
            return self.clone();
        }
        self.0
            .meta
            .terminal
            .get_or_init(|| ensure_sufficient_stack(|| self.collapse_symbolic()))
            .clone()
    }

    /// Memoized indexed form: `None` or `Indexed`.
    pub fn indexed_form(&self) -> Discrete {
        if matches!(self.0.shape, Shape::None | Shape::Indexed(_)) {
            return self.clone();
        }
        self.0
            .meta
            .indexed
            .get_or_init(|| {
                let terminal = self.terminal_form();
                if matches!(terminal.shape(), Shape::None | Shape::Indexed(_)) {
                    terminal
                } else {
                    terminal.index_runs()
                }
            })
            .clone()
    }

    #[tracing::instrument(level = "trace", skip_all, fields(flavor = ?self.0.flavor))]
    fn collapse_symbolic(&self) -> Discrete {
        match &self.0.shape {
            Shape::Catenated(..) => self.flatten_catenation(),
            Shape::Summed(..) => self.flatten_sum(),
            Shape::Unique(child) => {
                let indexed = child.indexed_form();
                if indexed.is_none() || indexed.indexed_map().values().all(|&n| n == 1) {
                    return indexed;
                }
                let map = indexed
                    .indexed_map()
                    .keys()
                    .map(|member| (member.clone(), 1))
                    .collect();
                Discrete::from_shape(Flavor::Unordered, Shape::Indexed(map))
            }
            other => unreachable!("{other:?} is already terminal"),
        }
    }

    /// Concatenate the terminal forms of every leaf under a chain of
    /// catenations.
    fn flatten_catenation(&self) -> Discrete {
        let mut pieces: Vec<Discrete> = Vec::new();
        let mut stack: Vec<&Discrete> = vec![self];
        while let Some(node) = stack.pop() {
            match &node.0.shape {
                Shape::Catenated(left, right) if node.0.meta.terminal.get().is_none() => {
                    stack.push(right);
                    stack.push(left);
                }
                _ => {
                    let piece = node.terminal_form();
                    if !piece.is_none() {
                        pieces.push(piece);
                    }
                }
            }
        }
        tracing::trace!(pieces = pieces.len(), "flattened catenation");

        if pieces.len() <= 1 {
            return pieces
                .pop()
                .unwrap_or_else(|| Discrete::empty(Flavor::Ordered));
        }
        if let Shape::Singular { member: first, .. } = pieces[0].shape() {
            let runs_of_first = pieces.iter().try_fold(0u64, |total, piece| match piece.shape() {
                Shape::Singular {
                    member,
                    multiplicity,
                } if member.same(first) => Some(total.saturating_add(*multiplicity)),
                _ => None,
            });
            if let Some(total) = runs_of_first {
                return Discrete::singular(Flavor::Ordered, first.clone(), total);
            }
        }
        let mut members = Vec::new();
        for piece in &pieces {
            piece.for_each_run(|member, n| {
                for _ in 0..n {
                    members.push(member.clone());
                }
            });
        }
        Discrete::from_shape(Flavor::Ordered, Shape::Arrayed(members.into()))
    }

    /// Merge the indexed forms of every leaf under a chain of sums.
    fn flatten_sum(&self) -> Discrete {
        let mut leaves: Vec<Discrete> = Vec::new();
        let mut stack: Vec<&Discrete> = vec![self];
        while let Some(node) = stack.pop() {
            match &node.0.shape {
                Shape::Summed(left, right) if node.0.meta.terminal.get().is_none() => {
                    stack.push(right);
                    stack.push(left);
                }
                _ => {
                    let leaf = node.indexed_form();
                    if !leaf.is_none() {
                        leaves.push(leaf);
                    }
                }
            }
        }
        tracing::trace!(leaves = leaves.len(), "flattened sum");

        if leaves.len() <= 1 {
            return leaves
                .pop()
                .unwrap_or_else(|| Discrete::empty(Flavor::Unordered));
        }
        let largest = leaves
            .iter()
            .enumerate()
            .max_by_key(|(_, leaf)| leaf.indexed_map().len())
            .map_or(0, |(i, _)| i);
        let base = leaves.swap_remove(largest);
        let mut map = base.indexed_map().clone();
        for leaf in &leaves {
            for (member, n) in leaf.indexed_map() {
                let slot = map.entry(member.clone()).or_insert(0);
                *slot = slot.saturating_add(*n);
            }
        }
        Discrete::from_shape(Flavor::Unordered, Shape::Indexed(map))
    }

    fn indexed_map(&self) -> &FxHashMap<Value, u64> {
        match &self.0.shape {
            Shape::Indexed(map) => map,
            other => unreachable!("expected an indexed node, found {other:?}"),
        }
    }

    fn index_runs(&self) -> Discrete {
        let mut map: FxHashMap<Value, u64> = FxHashMap::default();
        self.for_each_run(|member, n| {
            let slot = map.entry(member.clone()).or_insert(0);
            *slot = slot.saturating_add(n);
        });
        Discrete::from_shape(Flavor::Unordered, Shape::Indexed(map))
    }

    /// Visit `(member, multiplicity)` runs of a terminal node.
    fn for_each_run(&self, mut visit: impl FnMut(&Value, u64)) {
        match &self.0.shape {
            Shape::None => {}
            Shape::Singular {
                member,
                multiplicity,
            } => visit(member, *multiplicity),
            Shape::Arrayed(members) => members.iter().for_each(|m| visit(m, 1)),
            Shape::ArrayedCounted(members) => members.iter().for_each(|(m, n)| visit(m, *n)),
            Shape::Indexed(map) => map.iter().for_each(|(m, n)| visit(m, *n)),
            other => unreachable!("runs requested from symbolic node {other:?}"),
        }
    }

    /// Members with multiplicities: in order for arrays (adjacent repeats
    /// stay separate), one entry per distinct member for sets and bags.
    pub fn members(&self) -> Vec<(Value, u64)> {
        let flat = match self.flavor() {
            Flavor::Ordered => self.terminal_form(),
            Flavor::Unordered => self.indexed_form(),
        };
        let mut runs = Vec::new();
        flat.for_each_run(|member, n| runs.push((member.clone(), n)));
        runs
    }

    /// Every member, repeated per multiplicity.
    pub fn to_vec(&self) -> Vec<Value> {
        let mut out = Vec::new();
        for (member, n) in self.members() {
            for _ in 0..n {
                out.push(member.clone());
            }
        }
        out
    }

    /// How many times `member` occurs.
    pub fn multiplicity_of(&self, member: &Value) -> u64 {
        match self.indexed_form().shape() {
            Shape::None => 0,
            Shape::Indexed(map) => map.get(member).copied().unwrap_or(0),
            other => unreachable!("indexed form has shape {other:?}"),
        }
    }

    /// Whether no member occurs more than once.
    pub fn is_unique(&self) -> bool {
        *self.0.meta.unique.get_or_init(|| match &self.0.shape {
            Shape::None | Shape::Unique(_) => true,
            Shape::Singular { multiplicity, .. } => *multiplicity == 1,
            _ => match self.indexed_form().shape() {
                Shape::None => true,
                Shape::Indexed(map) => map.values().all(|&n| n == 1),
                other => unreachable!("indexed form has shape {other:?}"),
            },
        })
    }

    /// Any one member, found without flattening.
    pub fn pick_arbitrary_member(&self) -> Option<&Value> {
        let mut node = self;
        loop {
            match &node.0.shape {
                Shape::None => return None,
                Shape::Singular { member, .. } => return Some(member),
                Shape::Arrayed(members) => return members.first(),
                Shape::ArrayedCounted(members) => return members.first().map(|(m, _)| m),
                Shape::Indexed(map) => return map.keys().next(),
                Shape::Catenated(left, right) | Shape::Summed(left, right) => {
                    node = if left.is_empty() { right } else { left };
                }
                Shape::Unique(child) => node = child,
            }
        }
    }

    /// Whether every member is a Tuple and all share one heading.
    pub fn is_relational(&self) -> bool {
        *self
            .0
            .meta
            .relational
            .get_or_init(|| ensure_sufficient_stack(|| self.compute_relational()))
    }

    fn compute_relational(&self) -> bool {
        match &self.0.shape {
            Shape::None => true,
            Shape::Singular { member, .. } => member.as_tuple().is_some(),
            Shape::Arrayed(members) => share_one_heading(members.iter()),
            Shape::ArrayedCounted(members) => share_one_heading(members.iter().map(|(m, _)| m)),
            Shape::Indexed(map) => share_one_heading(map.keys()),
            // Each side is relational on its own, so comparing one
            // representative per side settles the whole.
            Shape::Catenated(left, right) | Shape::Summed(left, right) => {
                left.is_relational()
                    && right.is_relational()
                    && representatives_agree(left, right)
            }
            Shape::Unique(child) => child.is_relational(),
        }
    }

    /// Heading shared by the members of a nonempty relational tree.
    pub fn common_heading(&self) -> Option<Heading> {
        if !self.is_relational() {
            return None;
        }
        self.pick_arbitrary_member()
            .and_then(Value::as_tuple)
            .map(|t| t.heading().clone())
    }
}

fn share_one_heading<'a>(mut members: impl Iterator<Item = &'a Value>) -> bool {
    let Some(first) = members.next() else {
        return true;
    };
    let Some(reference) = first.as_tuple() else {
        return false;
    };
    members.all(|m| {
        m.as_tuple()
            .is_some_and(|t| t.heading().same_names(reference.heading()))
    })
}

fn representatives_agree(left: &Discrete, right: &Discrete) -> bool {
    match (left.pick_arbitrary_member(), right.pick_arbitrary_member()) {
        (Some(a), Some(b)) => match (a.as_tuple(), b.as_tuple()) {
            (Some(x), Some(y)) => x.heading().same_names(y.heading()),
            _ => false,
        },
        _ => true,
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if !self.shape.is_symbolic() {
            return;
        }
        let mut pending: Vec<Discrete> = Vec::new();
        detach_children(&mut self.shape, &mut pending);
        while let Some(child) = pending.pop() {
            if let Some(mut node) = Heap::into_inner(child.0) {
                detach_children(&mut node.shape, &mut pending);
            }
        }
    }
}

fn detach_children(shape: &mut Shape, pending: &mut Vec<Discrete>) {
    if !shape.is_symbolic() {
        return;
    }
    match std::mem::replace(shape, Shape::None) {
        Shape::Catenated(left, right) | Shape::Summed(left, right) => {
            pending.push(left);
            pending.push(right);
        }
        Shape::Unique(child) => pending.push(child),
        _ => {}
    }
}

impl fmt::Debug for Discrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Discrete")
            .field(&self.0.flavor)
            .field(&self.0.shape)
            .finish()
    }
}
