//! The memory pool: the only factory for values.
//!
//! Every constructor first checks whether the requested value is one of the
//! pool's canonical singletons (an empty collection, the nullary tuple, a
//! well-known excuse) and returns it without allocating. Small integers,
//! short texts and small headings are interned in bounded caches, so
//! rebuilding an equal small value returns the earlier instance.
//!
//! Interning is an optimization only. Equality never relies on it.

mod cache;
mod excuses;

use std::any::Any;
use std::sync::Arc;

use muon_text::Measure;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use rustc_hash::FxHashMap;

use crate::config::PoolConfig;
use crate::discrete::{Discrete, Flavor};
use crate::encode::heading_text;
use crate::errors::{ValueError, ValueResult};
use crate::value::{
    Article, AttrName, BaseKind, Bits, Blob, External, FixedDecimal, Fraction, Handle, Heading,
    NameList, Relational, Repr, Text, Tuple, Value, Variable,
};

use cache::InternCache;

/// Factory and interning store for values.
///
/// A pool is `Send + Sync`; its caches are sharded and locked internally.
pub struct MemoryPool {
    config: PoolConfig,

    false_value: Value,
    true_value: Value,
    zero_fraction: Value,
    empty_bits: Value,
    empty_blob: Value,
    empty_text: Value,
    empty_array: Value,
    empty_set: Value,
    empty_bag: Value,
    empty_heading: Value,
    nullary_tuple: Value,

    integers: InternCache<i64>,
    texts: InternCache<Box<[u16]>>,
    headings: InternCache<Box<[AttrName]>>,
    excuses: FxHashMap<&'static str, Value>,
}

impl Default for MemoryPool {
    fn default() -> Self {
        MemoryPool::new()
    }
}

impl MemoryPool {
    pub fn new() -> Self {
        MemoryPool::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        tracing::debug!(?config, "creating memory pool");
        let empty_heading = Value::new(Repr::Heading(Heading::from_sorted(NameList::new())));
        let nullary_tuple = Value::new(Repr::Tuple(Tuple::new(
            Heading::from_sorted(NameList::new()),
            Box::default(),
        )));
        let mut pool = MemoryPool {
            false_value: Value::new(Repr::Boolean(false)),
            true_value: Value::new(Repr::Boolean(true)),
            zero_fraction: Value::new(Repr::Fraction(Fraction::from_decimal(FixedDecimal::new(
                BigInt::zero(),
                0,
            )))),
            empty_bits: Value::new(Repr::Bits(Bits::new(Vec::new()))),
            empty_blob: Value::new(Repr::Blob(Blob::new(Vec::new()))),
            empty_text: Value::new(Repr::Text(Text::new(Box::default(), Measure::default()))),
            empty_array: Value::new(Repr::Array(Discrete::empty(Flavor::Ordered))),
            empty_set: Value::new(Repr::Set(Discrete::empty(Flavor::Unordered))),
            empty_bag: Value::new(Repr::Bag(Discrete::empty(Flavor::Unordered))),
            empty_heading,
            nullary_tuple,
            integers: InternCache::new("integers", config.cache_capacity),
            texts: InternCache::new("texts", config.cache_capacity),
            headings: InternCache::new("headings", config.cache_capacity),
            excuses: FxHashMap::default(),
            config,
        };

        // Positional argument headings recur on every call.
        for degree in 1..=3 {
            let names: Vec<AttrName> = (0..degree).filter_map(positional_name).collect();
            pool.heading(names.iter().map(|n| &**n));
        }
        for position in 1..3 {
            pool.heading(positional_name(position).as_deref());
        }

        let excuses: FxHashMap<&'static str, Value> = excuses::WELL_KNOWN
            .iter()
            .map(|&label| {
                let value = Value::new(Repr::Excuse(Article::new(
                    pool.text_from_str(label),
                    pool.nullary_tuple.clone(),
                )));
                (label, value)
            })
            .collect();
        pool.excuses = excuses;
        pool
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Values currently remembered across all interning caches.
    pub fn cached_values(&self) -> usize {
        self.integers.len() + self.texts.len() + self.headings.len()
    }

    // Scalars

    pub fn boolean(&self, b: bool) -> Value {
        if b {
            self.true_value.clone()
        } else {
            self.false_value.clone()
        }
    }

    pub fn integer(&self, n: impl Into<BigInt>) -> Value {
        let n = n.into();
        let small = n
            .to_i64()
            .filter(|v| v.unsigned_abs() <= self.config.integer_cache_magnitude);
        match small {
            Some(key) => self.integers.intern(key, || Value::new(Repr::Integer(n))),
            None => Value::new(Repr::Integer(n)),
        }
    }

    /// A fraction from a fixed-point decimal.
    pub fn fraction_decimal(&self, decimal: FixedDecimal) -> Value {
        if decimal.is_zero() {
            return self.zero_fraction.clone();
        }
        Value::new(Repr::Fraction(Fraction::from_decimal(decimal)))
    }

    /// `numerator / denominator`, sign moved onto the numerator. The pair is
    /// reduced lazily, not here.
    pub fn fraction(
        &self,
        numerator: impl Into<BigInt>,
        denominator: impl Into<BigInt>,
    ) -> ValueResult<Value> {
        let (mut numerator, mut denominator) = (numerator.into(), denominator.into());
        if denominator.is_zero() {
            return Err(ValueError::ZeroDenominator);
        }
        if numerator.is_zero() {
            return Ok(self.zero_fraction.clone());
        }
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        Ok(Value::new(Repr::Fraction(Fraction::from_ratio(
            numerator,
            denominator,
        ))))
    }

    pub fn bits(&self, bits: Vec<bool>) -> Value {
        if bits.is_empty() {
            return self.empty_bits.clone();
        }
        Value::new(Repr::Bits(Bits::new(bits)))
    }

    pub fn blob(&self, bytes: Vec<u8>) -> Value {
        if bytes.is_empty() {
            return self.empty_blob.clone();
        }
        Value::new(Repr::Blob(Blob::new(bytes)))
    }

    /// Text from UTF-16 code units; fails on an unpaired surrogate.
    pub fn text(&self, units: &[u16]) -> ValueResult<Value> {
        let measure = muon_text::measure(units)?;
        Ok(self.measured_text(units, measure))
    }

    pub fn text_from_str(&self, s: &str) -> Value {
        let units = muon_text::encode(s);
        let measure = Measure {
            code_points: s.chars().count(),
            has_non_bmp: s.chars().any(|c| c.len_utf16() == 2),
        };
        self.measured_text(&units, measure)
    }

    /// Like [`MemoryPool::text`], but malformed input yields the
    /// `Malformed_Text` excuse.
    pub fn text_or_excuse(&self, units: &[u16]) -> Value {
        match self.text(units) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(%err, "text construction excused");
                self.excuse(excuses::MALFORMED_TEXT)
            }
        }
    }

    fn measured_text(&self, units: &[u16], measure: Measure) -> Value {
        if units.is_empty() {
            return self.empty_text.clone();
        }
        let make = || Value::new(Repr::Text(Text::new(units.into(), measure)));
        if units.len() <= self.config.text_cache_max_units {
            self.texts.intern(units.into(), make)
        } else {
            make()
        }
    }

    // Collections

    pub fn array(&self, members: Vec<Value>) -> Value {
        if members.is_empty() {
            return self.empty_array.clone();
        }
        Value::new(Repr::Array(Discrete::arrayed(members)))
    }

    /// A set of `members`; repeats are removed lazily.
    pub fn set(&self, members: Vec<Value>) -> Value {
        match members.len() {
            0 => self.empty_set.clone(),
            1 => Value::new(Repr::Set(Discrete::counted(
                members.into_iter().map(|m| (m, 1)).collect(),
            ))),
            _ => Value::new(Repr::Set(Discrete::unique(Discrete::counted(
                members.into_iter().map(|m| (m, 1)).collect(),
            )))),
        }
    }

    /// A bag of `(member, multiplicity)` entries. Zero multiplicities are
    /// dropped; the same member may be listed more than once.
    pub fn bag(&self, members: Vec<(Value, u64)>) -> ValueResult<Value> {
        let mut total = 0u64;
        let mut kept = Vec::with_capacity(members.len());
        for (member, n) in members {
            if n == 0 {
                continue;
            }
            total = total
                .checked_add(n)
                .ok_or(ValueError::MultiplicityOverflow)?;
            kept.push((member, n));
        }
        if kept.is_empty() {
            return Ok(self.empty_bag.clone());
        }
        Ok(Value::new(Repr::Bag(Discrete::counted(kept))))
    }

    /// `left` followed by `right`, without copying either. Fails when the
    /// combined length would exceed `u64::MAX`.
    pub fn catenate(&self, left: &Value, right: &Value) -> ValueResult<Value> {
        let (l, r) = (expect_array(left)?, expect_array(right)?);
        if l.is_empty() {
            return Ok(right.clone());
        }
        if r.is_empty() {
            return Ok(left.clone());
        }
        l.count()
            .checked_add(r.count())
            .ok_or(ValueError::MultiplicityOverflow)?;
        Ok(Value::new(Repr::Array(Discrete::catenated(
            l.clone(),
            r.clone(),
        ))))
    }

    /// Multiset union of two bags: multiplicities add.
    pub fn bag_union(&self, left: &Value, right: &Value) -> ValueResult<Value> {
        let (l, r) = (expect_bag(left)?, expect_bag(right)?);
        if l.is_empty() {
            return Ok(right.clone());
        }
        if r.is_empty() {
            return Ok(left.clone());
        }
        l.count()
            .checked_add(r.count())
            .ok_or(ValueError::MultiplicityOverflow)?;
        Ok(Value::new(Repr::Bag(Discrete::summed(l.clone(), r.clone()))))
    }

    pub fn set_union(&self, left: &Value, right: &Value) -> ValueResult<Value> {
        let (l, r) = (expect_set(left)?, expect_set(right)?);
        if l.is_empty() {
            return Ok(right.clone());
        }
        if r.is_empty() {
            return Ok(left.clone());
        }
        Ok(Value::new(Repr::Set(Discrete::unique(Discrete::summed(
            l.clone(),
            r.clone(),
        )))))
    }

    /// The set of distinct members of a bag (or a set, unchanged).
    pub fn unique(&self, collection: &Value) -> ValueResult<Value> {
        match collection.repr() {
            Repr::Set(_) => Ok(collection.clone()),
            Repr::Bag(tree) if tree.is_empty() => Ok(self.empty_set.clone()),
            Repr::Bag(tree) => Ok(Value::new(Repr::Set(Discrete::unique(tree.clone())))),
            other => Err(ValueError::kind_mismatch("Bag or Set", other.kind())),
        }
    }

    // Headings, tuples and articles

    /// A heading naming each of `names`; repeats are ignored.
    pub fn heading<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Value {
        let mut names: NameList = names.into_iter().map(AttrName::from).collect();
        names.sort_unstable();
        names.dedup();
        self.heading_value(names)
    }

    fn heading_value(&self, names: NameList) -> Value {
        if names.is_empty() {
            return self.empty_heading.clone();
        }
        let cacheable = names.len() <= self.config.heading_cache_max_attrs
            && names
                .iter()
                .all(|n| n.encode_utf16().count() <= self.config.heading_cache_max_name_units);
        if cacheable {
            let key: Box<[AttrName]> = names.iter().cloned().collect();
            self.headings
                .intern(key, || Value::new(Repr::Heading(Heading::from_sorted(names))))
        } else {
            Value::new(Repr::Heading(Heading::from_sorted(names)))
        }
    }

    /// Shared `Heading` for sorted, distinct `names`.
    fn heading_of(&self, names: NameList) -> Heading {
        let value = self.heading_value(names);
        match value.repr() {
            Repr::Heading(h) => h.clone(),
            other => unreachable!("heading cache holds a {}", other.kind()),
        }
    }

    /// A tuple of `(name, value)` attributes.
    pub fn tuple<N: AsRef<str>>(
        &self,
        attrs: impl IntoIterator<Item = (N, Value)>,
    ) -> ValueResult<Value> {
        let mut pairs: Vec<(AttrName, Value)> = attrs
            .into_iter()
            .map(|(name, value)| (AttrName::from(name.as_ref()), value))
            .collect();
        if pairs.is_empty() {
            return Ok(self.nullary_tuple.clone());
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(pair) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ValueError::DuplicateAttribute {
                name: pair[0].0.to_string(),
            });
        }
        let (names, values): (NameList, Vec<Value>) = pairs.into_iter().unzip();
        let heading = self.heading_of(names);
        Ok(Value::new(Repr::Tuple(Tuple::new(heading, values.into()))))
    }

    /// A tuple of positional arguments, keyed `"\u{0}"`, `"\u{1}"`, ...
    pub fn arguments(&self, args: &[Option<Value>]) -> ValueResult<Value> {
        let mut pairs = Vec::with_capacity(args.len());
        for (position, arg) in args.iter().enumerate() {
            let value = arg
                .clone()
                .ok_or(ValueError::MissingArgument { position })?;
            let name = positional_name(position).ok_or(ValueError::MissingArgument { position })?;
            pairs.push((name, value));
        }
        self.tuple(pairs)
    }

    pub fn article(&self, label: Value, attrs: Value) -> ValueResult<Value> {
        expect_tuple("article attributes", &attrs)?;
        Ok(Value::new(Repr::Article(Article::new(label, attrs))))
    }

    /// An excuse with no attributes, preseeded ones shared.
    pub fn excuse(&self, label: &str) -> Value {
        match self.excuses.get(label) {
            Some(known) => known.clone(),
            None => Value::new(Repr::Excuse(Article::new(
                self.text_from_str(label),
                self.nullary_tuple.clone(),
            ))),
        }
    }

    pub fn excuse_with(&self, label: Value, attrs: Value) -> ValueResult<Value> {
        let tuple = expect_tuple("excuse attributes", &attrs)?;
        if tuple.is_empty() {
            if let Some(known) = label
                .as_text()
                .and_then(|t| self.excuses.get(t.to_rust_string().as_str()))
            {
                return Ok(known.clone());
            }
        }
        Ok(Value::new(Repr::Excuse(Article::new(label, attrs))))
    }

    // Relational values

    /// Heading inferred from a nonempty Array of tuples.
    pub fn tuple_array(&self, body: Value) -> ValueResult<Value> {
        self.relational(BaseKind::TupleArray, None, body)
    }

    pub fn tuple_array_with_heading(&self, heading: &Value, body: Value) -> ValueResult<Value> {
        self.relational(BaseKind::TupleArray, Some(heading), body)
    }

    /// Heading inferred from a nonempty Set of tuples.
    pub fn relation(&self, body: Value) -> ValueResult<Value> {
        self.relational(BaseKind::Relation, None, body)
    }

    pub fn relation_with_heading(&self, heading: &Value, body: Value) -> ValueResult<Value> {
        self.relational(BaseKind::Relation, Some(heading), body)
    }

    /// Heading inferred from a nonempty Bag of tuples.
    pub fn tuple_bag(&self, body: Value) -> ValueResult<Value> {
        self.relational(BaseKind::TupleBag, None, body)
    }

    pub fn tuple_bag_with_heading(&self, heading: &Value, body: Value) -> ValueResult<Value> {
        self.relational(BaseKind::TupleBag, Some(heading), body)
    }

    fn relational(
        &self,
        kind: BaseKind,
        heading: Option<&Value>,
        body: Value,
    ) -> ValueResult<Value> {
        let body_kind = match kind {
            BaseKind::TupleArray => BaseKind::Array,
            BaseKind::Relation => BaseKind::Set,
            BaseKind::TupleBag => BaseKind::Bag,
            other => unreachable!("{other} is not relational"),
        };
        if body.kind() != body_kind {
            return Err(ValueError::kind_mismatch(body_kind.name(), body.kind()));
        }
        let explicit = match heading {
            Some(h) => Some(
                h.as_heading()
                    .ok_or_else(|| ValueError::kind_mismatch("Heading", h.kind()))?
                    .clone(),
            ),
            None => None,
        };
        let Some(tree) = body.as_discrete() else {
            unreachable!("{body_kind} without a collection tree")
        };

        let heading = if tree.is_empty() {
            explicit.ok_or(ValueError::NoHeadingInferable { kind })?
        } else {
            let found = match tree.common_heading() {
                Some(found) => found,
                None => return Err(relational_failure(kind, tree)),
            };
            match explicit {
                Some(expected) if !expected.same_names(&found) => {
                    return Err(ValueError::HeadingMismatch {
                        expected: heading_text(&expected),
                        found: heading_text(&found),
                    });
                }
                Some(expected) => expected,
                None => found,
            }
        };

        let rel = Relational::new(heading, body);
        Ok(Value::new(match kind {
            BaseKind::TupleArray => Repr::TupleArray(rel),
            BaseKind::Relation => Repr::Relation(rel),
            _ => Repr::TupleBag(rel),
        }))
    }

    // Handles

    pub fn new_variable(&self, initial: Value) -> Value {
        Value::new(Repr::Variable(Variable::new(Handle::fresh(), initial)))
    }

    pub fn new_process(&self) -> Value {
        Value::new(Repr::Process(Handle::fresh()))
    }

    pub fn new_stream(&self) -> Value {
        Value::new(Repr::Stream(Handle::fresh()))
    }

    pub fn new_external(&self, payload: Arc<dyn Any + Send + Sync>) -> Value {
        Value::new(Repr::External(External::new(Handle::fresh(), payload)))
    }

    /// The default value of `kind`, where it has one.
    ///
    /// Relational kinds default to an empty body under the empty heading;
    /// Excuse defaults to `No_Reason`. Articles and handles have no default.
    pub fn default_of(&self, kind: BaseKind) -> Option<Value> {
        let value = match kind {
            BaseKind::BooleanFalse | BaseKind::BooleanTrue => self.false_value.clone(),
            BaseKind::Integer => self.integer(0),
            BaseKind::Fraction => self.zero_fraction.clone(),
            BaseKind::Bits => self.empty_bits.clone(),
            BaseKind::Blob => self.empty_blob.clone(),
            BaseKind::Text => self.empty_text.clone(),
            BaseKind::Array => self.empty_array.clone(),
            BaseKind::Set => self.empty_set.clone(),
            BaseKind::Bag => self.empty_bag.clone(),
            BaseKind::Heading => self.empty_heading.clone(),
            BaseKind::Tuple => self.nullary_tuple.clone(),
            BaseKind::TupleArray | BaseKind::Relation | BaseKind::TupleBag => {
                let body = match kind {
                    BaseKind::TupleArray => self.empty_array.clone(),
                    BaseKind::Relation => self.empty_set.clone(),
                    _ => self.empty_bag.clone(),
                };
                let rel = Relational::new(self.heading_of(NameList::new()), body);
                Value::new(match kind {
                    BaseKind::TupleArray => Repr::TupleArray(rel),
                    BaseKind::Relation => Repr::Relation(rel),
                    _ => Repr::TupleBag(rel),
                })
            }
            BaseKind::Excuse => self.excuse(excuses::NO_REASON),
            BaseKind::Article
            | BaseKind::Variable
            | BaseKind::Process
            | BaseKind::Stream
            | BaseKind::External => return None,
        };
        Some(value)
    }
}

/// Reserved attribute name for argument `position`: the code point of that
/// number, skipping the surrogate block.
fn positional_name(position: usize) -> Option<AttrName> {
    let position = u32::try_from(position).ok()?;
    let code_point = if position < 0xD800 {
        position
    } else {
        position.checked_add(0x800)?
    };
    char::from_u32(code_point).map(|c| AttrName::from(c.to_string()))
}

fn expect_array(value: &Value) -> ValueResult<&Discrete> {
    value
        .as_array()
        .ok_or_else(|| ValueError::kind_mismatch("Array", value.kind()))
}

fn expect_bag(value: &Value) -> ValueResult<&Discrete> {
    value
        .as_bag()
        .ok_or_else(|| ValueError::kind_mismatch("Bag", value.kind()))
}

fn expect_set(value: &Value) -> ValueResult<&Discrete> {
    value
        .as_set()
        .ok_or_else(|| ValueError::kind_mismatch("Set", value.kind()))
}

fn expect_tuple<'a>(role: &'static str, value: &'a Value) -> ValueResult<&'a Tuple> {
    value.as_tuple().ok_or(ValueError::NotATuple {
        role,
        found: value.kind(),
    })
}

/// Explain why a nonempty body is not relational.
fn relational_failure(kind: BaseKind, tree: &Discrete) -> ValueError {
    let members = tree.members();
    if let Some((member, _)) = members.iter().find(|(m, _)| m.as_tuple().is_none()) {
        return ValueError::NotRelational {
            kind,
            found: member.kind(),
        };
    }
    let mut headings = members
        .iter()
        .filter_map(|(m, _)| m.as_tuple())
        .map(Tuple::heading);
    let first = headings.next();
    match (first, first.and_then(|f| headings.find(|h| !h.same_names(f)))) {
        (Some(expected), Some(found)) => ValueError::HeadingMismatch {
            expected: heading_text(expected),
            found: heading_text(found),
        },
        _ => unreachable!("body of one heading reported as not relational"),
    }
}
