//! The closed set of base kinds.

/// Base kind tag carried by every value.
///
/// The two booleans are separate kinds so that a kind comparison alone
/// decides equality between booleans.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum BaseKind {
    BooleanFalse,
    BooleanTrue,
    Integer,
    Fraction,
    Bits,
    Blob,
    Text,
    Array,
    Set,
    Bag,
    Heading,
    Tuple,
    /// Heading paired with an Array of matching tuples.
    TupleArray,
    /// Heading paired with a Set of matching tuples.
    Relation,
    /// Heading paired with a Bag of matching tuples.
    TupleBag,
    Article,
    /// Failure marker; shaped like an Article.
    Excuse,
    Variable,
    Process,
    Stream,
    External,
}

impl BaseKind {
    /// All base kinds, in declaration order.
    pub const ALL: [BaseKind; 21] = [
        BaseKind::BooleanFalse,
        BaseKind::BooleanTrue,
        BaseKind::Integer,
        BaseKind::Fraction,
        BaseKind::Bits,
        BaseKind::Blob,
        BaseKind::Text,
        BaseKind::Array,
        BaseKind::Set,
        BaseKind::Bag,
        BaseKind::Heading,
        BaseKind::Tuple,
        BaseKind::TupleArray,
        BaseKind::Relation,
        BaseKind::TupleBag,
        BaseKind::Article,
        BaseKind::Excuse,
        BaseKind::Variable,
        BaseKind::Process,
        BaseKind::Stream,
        BaseKind::External,
    ];

    /// Name used in literal tags and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            BaseKind::BooleanFalse | BaseKind::BooleanTrue => "Boolean",
            BaseKind::Integer => "Integer",
            BaseKind::Fraction => "Fraction",
            BaseKind::Bits => "Bits",
            BaseKind::Blob => "Blob",
            BaseKind::Text => "Text",
            BaseKind::Array => "Array",
            BaseKind::Set => "Set",
            BaseKind::Bag => "Bag",
            BaseKind::Heading => "Heading",
            BaseKind::Tuple => "Tuple",
            BaseKind::TupleArray => "Tuple-Array",
            BaseKind::Relation => "Relation",
            BaseKind::TupleBag => "Tuple-Bag",
            BaseKind::Article => "Article",
            BaseKind::Excuse => "Excuse",
            BaseKind::Variable => "Variable",
            BaseKind::Process => "Process",
            BaseKind::Stream => "Stream",
            BaseKind::External => "External",
        }
    }

    /// Opaque handle kinds: equal only to the very same instance.
    pub const fn is_handle(self) -> bool {
        matches!(
            self,
            BaseKind::Variable | BaseKind::Process | BaseKind::Stream | BaseKind::External
        )
    }

    /// Array, Set and Bag.
    pub const fn is_discrete(self) -> bool {
        matches!(self, BaseKind::Array | BaseKind::Set | BaseKind::Bag)
    }

    /// Tuple-Array, Relation and Tuple-Bag.
    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            BaseKind::TupleArray | BaseKind::Relation | BaseKind::TupleBag
        )
    }
}

impl std::fmt::Display for BaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
