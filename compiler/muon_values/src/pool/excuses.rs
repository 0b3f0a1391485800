//! Well-known excuse labels, preseeded in every pool.

pub(crate) const NO_REASON: &str = "No_Reason";
pub(crate) const MALFORMED_TEXT: &str = "Malformed_Text";

pub(crate) const WELL_KNOWN: [&str; 10] = [
    NO_REASON,
    "Before_All_Others",
    "After_All_Others",
    "Div_By_Zero",
    "Zero_Divisor",
    "No_Such_Ordinal_Pos",
    "No_Such_Attr_Name",
    "Not_Same_Heading",
    MALFORMED_TEXT,
    "Unrecognized_Value",
];
