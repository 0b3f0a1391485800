//! Headings and tuples.

use std::sync::Arc;

use smallvec::SmallVec;

use super::heap::Heap;
use super::Value;

/// An attribute name.
pub type AttrName = Arc<str>;

/// Inline capacity for heading names; most headings are tiny.
pub(crate) type NameList = SmallVec<[AttrName; 4]>;

/// A set of attribute names, kept sorted.
#[derive(Clone, Debug)]
pub struct Heading {
    names: Heap<NameList>,
}

impl Heading {
    /// `names` must be sorted and free of duplicates.
    pub(crate) fn from_sorted(names: NameList) -> Self {
        debug_assert!(names.windows(2).all(|w| w[0] < w[1]));
        Heading {
            names: Heap::new(names),
        }
    }

    pub fn names(&self) -> &[AttrName] {
        &self.names
    }

    /// Number of attributes.
    pub fn degree(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sorted position of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| (**n).cmp(name)).ok()
    }

    /// Whether both headings name exactly the same attributes.
    pub fn same_names(&self, other: &Heading) -> bool {
        Heap::ptr_eq(&self.names, &other.names) || self.names[..] == other.names[..]
    }
}

impl PartialEq for Heading {
    fn eq(&self, other: &Self) -> bool {
        self.same_names(other)
    }
}

impl Eq for Heading {}

/// A mapping from attribute name to value.
///
/// `values[i]` belongs to `heading.names()[i]`.
#[derive(Clone, Debug)]
pub struct Tuple {
    heading: Heading,
    values: Box<[Value]>,
}

impl Tuple {
    pub(crate) fn new(heading: Heading, values: Box<[Value]>) -> Self {
        debug_assert_eq!(heading.degree(), values.len());
        Tuple { heading, values }
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    pub fn degree(&self) -> usize {
        self.values.len()
    }

    /// Whether this is the nullary tuple.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.heading.position(name).map(|i| &self.values[i])
    }

    /// Values in heading order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(name, value)` pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&AttrName, &Value)> {
        self.heading.names().iter().zip(self.values.iter())
    }
}
