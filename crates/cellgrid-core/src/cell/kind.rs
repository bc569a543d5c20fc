//! Cell kind classification

use std::fmt;

/// The kind of content a raw input was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellKind {
    /// Free text (the fallback)
    #[default]
    Text,
    /// Decimal number
    Number,
    /// Calendar date
    Date,
    /// TRUE/FALSE and its aliases
    Boolean,
    /// Input starting with `=`
    Formula,
}

impl CellKind {
    /// Lower-case name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            CellKind::Text => "text",
            CellKind::Number => "number",
            CellKind::Date => "date",
            CellKind::Boolean => "boolean",
            CellKind::Formula => "formula",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
