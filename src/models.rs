//! Domain models passed between the calculator, the record store and the TUI.
//! These stay plain data holders so the other layers can focus on arithmetic,
//! persistence and presentation respectively.

use serde::{Deserialize, Serialize};

/// The three numbers a user types into the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalculationInput {
    /// Length of one stock bar.
    pub bar_length: f64,
    /// Target length of every cut piece.
    pub segment_length: f64,
    /// How many identical bars get cut.
    pub quantity: u32,
}

impl CalculationInput {
    pub fn new(bar_length: f64, segment_length: f64, quantity: u32) -> Self {
        Self {
            bar_length,
            segment_length,
            quantity,
        }
    }
}

/// Outcome of cutting one bar, plus the leftover across the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalculationResult {
    pub segments_per_bar: u64,
    pub remainder_per_bar: f64,
    pub total_remainder: f64,
}

impl CalculationResult {
    /// The result reported for inputs that cannot be cut.
    pub const ZERO: CalculationResult = CalculationResult {
        segments_per_bar: 0,
        remainder_per_bar: 0.0,
        total_remainder: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        self.segments_per_bar == 0
    }
}

/// A saved calculation. The serialized field names are the canonical
/// document format shared by the persisted collection and exported files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique within a collection. Never reused for another record.
    pub id: u64,
    pub name: String,
    pub rebar_length: f64,
    pub segment_length: f64,
    pub quantity: u32,
    /// Frozen copy of the result at save time; not recomputed on load.
    pub segments: u64,
    pub remainder: f64,
    pub total_remainder: f64,
    /// Creation timestamp in `DD.MM.YYYY, HH:MM:SS`. Survives edits.
    pub date: String,
}

impl Record {
    /// The input the record was computed from, for loading back into a form.
    pub fn input(&self) -> CalculationInput {
        CalculationInput::new(self.rebar_length, self.segment_length, self.quantity)
    }
}

/// Columns the records table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    RebarLength,
    SegmentLength,
    Quantity,
    Segments,
    Remainder,
    TotalRemainder,
    Date,
}

impl SortKey {
    /// Every key in table column order.
    pub const ALL: [SortKey; 8] = [
        SortKey::Name,
        SortKey::RebarLength,
        SortKey::SegmentLength,
        SortKey::Quantity,
        SortKey::Segments,
        SortKey::Remainder,
        SortKey::TotalRemainder,
        SortKey::Date,
    ];

    /// Column header shown in the table.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::RebarLength => "Bar",
            SortKey::SegmentLength => "Segment",
            SortKey::Quantity => "Qty",
            SortKey::Segments => "Pieces",
            SortKey::Remainder => "Remainder",
            SortKey::TotalRemainder => "Total rem.",
            SortKey::Date => "Date",
        }
    }

    /// Map the `1`..`8` shortcut keys to a column.
    pub fn from_digit(digit: char) -> Option<SortKey> {
        let index = digit.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow rendered next to the active column header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Which column is active and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        }
    }
}

/// Color scheme preference. Persisted as `"light"` / `"dark"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored preference. Anything unexpected falls back to light.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
