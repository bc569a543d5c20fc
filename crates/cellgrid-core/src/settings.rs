//! Display settings

use chrono::format::{Item, StrftimeItems};

/// Date layout used when no other is configured (`M/D/YYYY`)
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// How values are rendered into display text
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplaySettings {
    /// Thousands grouping separator (`None` disables grouping)
    pub thousands_separator: Option<char>,
    /// Decimal separator
    pub decimal_separator: char,
    /// Maximum number of fraction digits shown for numbers
    pub max_fraction_digits: usize,
    /// `chrono` format string for dates
    pub date_format: String,
    /// Append the error code to `#ERROR!`
    pub error_detail: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            thousands_separator: Some(','),
            decimal_separator: '.',
            max_fraction_digits: 3,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            error_detail: true,
        }
    }
}

impl DisplaySettings {
    /// Whether `date_format` only uses known strftime specifiers
    pub fn date_format_is_valid(&self) -> bool {
        StrftimeItems::new(&self.date_format).all(|item| !matches!(item, Item::Error))
    }
}
