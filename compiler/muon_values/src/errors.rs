//! Caller-input errors raised by value constructors.
//!
//! Every failure here is the caller's fault: malformed text, a zero
//! denominator, a body that does not share one heading, and so on. Engine
//! invariant violations are assertions, never `ValueError`s.
//!
//! These are host-level errors. A computation that merely has no answer
//! produces an Excuse *value* instead.

use muon_text::MalformedText;

use crate::value::BaseKind;

/// Result of a fallible value constructor.
pub type ValueResult<T> = Result<T, ValueError>;

/// Typed failure of a value constructor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("malformed text: {0}")]
    MalformedText(#[from] MalformedText),

    #[error("fraction denominator must not be zero")]
    ZeroDenominator,

    #[error("heading mismatch: expected {expected}, found {found}")]
    HeadingMismatch { expected: String, found: String },

    #[error("cannot build {kind}: body member of kind {found} is not a Tuple")]
    NotRelational { kind: BaseKind, found: BaseKind },

    #[error("cannot build {kind} from an empty body without an explicit heading")]
    NoHeadingInferable { kind: BaseKind },

    #[error("missing required argument at position {position}")]
    MissingArgument { position: usize },

    #[error("{role} must be a Tuple, found {found}")]
    NotATuple { role: &'static str, found: BaseKind },

    #[error("expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: BaseKind,
    },

    #[error("attribute {name:?} given more than once")]
    DuplicateAttribute { name: String },

    #[error("member count exceeds the 64-bit limit")]
    MultiplicityOverflow,
}

impl ValueError {
    pub(crate) fn kind_mismatch(expected: &'static str, found: BaseKind) -> Self {
        ValueError::KindMismatch { expected, found }
    }
}
