use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::calc::{compute, format_number, parse_length, parse_quantity};
use crate::config::{DEFAULT_BAR_LENGTH, DEFAULT_QUANTITY};
use crate::models::{CalculationInput, CalculationResult, Record};
use crate::records::ConfirmPrompt;

use super::theme::Palette;

/// Fields of the calculator form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum FormField {
    #[default]
    Name,
    BarLength,
    SegmentLength,
    Quantity,
}

impl FormField {
    pub(crate) const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::BarLength,
        FormField::SegmentLength,
        FormField::Quantity,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::BarLength => "Bar length",
            FormField::SegmentLength => "Segment length",
            FormField::Quantity => "Quantity",
        }
    }

    fn next(self) -> Self {
        match self {
            FormField::Name => FormField::BarLength,
            FormField::BarLength => FormField::SegmentLength,
            FormField::SegmentLength => FormField::Quantity,
            FormField::Quantity => FormField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            FormField::Name => FormField::Quantity,
            FormField::BarLength => FormField::Name,
            FormField::SegmentLength => FormField::BarLength,
            FormField::Quantity => FormField::SegmentLength,
        }
    }
}

/// Raw text of the calculator form. Values stay strings so partial input
/// like `12.` survives; parsing happens on every preview.
#[derive(Clone, Debug)]
pub(crate) struct CalcForm {
    pub(crate) name: String,
    pub(crate) bar_length: String,
    pub(crate) segment_length: String,
    pub(crate) quantity: String,
    pub(crate) active: FormField,
    pub(crate) error: Option<String>,
}

impl Default for CalcForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            bar_length: DEFAULT_BAR_LENGTH.to_string(),
            segment_length: String::new(),
            quantity: DEFAULT_QUANTITY.to_string(),
            active: FormField::Name,
            error: None,
        }
    }
}

impl CalcForm {
    /// Populate the form from a saved record when entering edit mode.
    pub(crate) fn from_record(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            bar_length: format_number(record.rebar_length),
            segment_length: format_number(record.segment_length),
            quantity: record.quantity.to_string(),
            active: FormField::Name,
            error: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn focus_previous(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            FormField::Name => {
                if ch.is_control() {
                    return false;
                }
                self.name.push(ch);
                true
            }
            FormField::BarLength => push_decimal(&mut self.bar_length, ch),
            FormField::SegmentLength => push_decimal(&mut self.segment_length, ch),
            FormField::Quantity => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.quantity.push(ch);
                true
            }
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    pub(crate) fn input(&self) -> CalculationInput {
        CalculationInput::new(
            parse_length(&self.bar_length),
            parse_length(&self.segment_length),
            parse_quantity(&self.quantity),
        )
    }

    /// Live result for the current text.
    pub(crate) fn preview(&self) -> CalculationResult {
        compute(&self.input())
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::BarLength => &self.bar_length,
            FormField::SegmentLength => &self.segment_length,
            FormField::Quantity => &self.quantity,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::BarLength => &mut self.bar_length,
            FormField::SegmentLength => &mut self.segment_length,
            FormField::Quantity => &mut self.quantity,
        }
    }

    /// Character count for cursor placement.
    pub(crate) fn value_len(&self, field: FormField) -> usize {
        self.value(field).chars().count()
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(
        &self,
        field: FormField,
        focused: bool,
        palette: &Palette,
    ) -> Line<'static> {
        let value = self.value(field);
        let is_active = focused && self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(palette.active)
        } else if value.is_empty() {
            Style::default().fg(palette.muted)
        } else {
            Style::default().fg(palette.text)
        };

        Line::from(vec![
            Span::styled(format!("{}: ", field.label()), Style::default().fg(palette.text)),
            Span::styled(display, style),
        ])
    }
}

/// Lengths accept digits and a single decimal separator. A comma is stored as
/// a dot so `12,5` parses.
fn push_decimal(value: &mut String, ch: char) -> bool {
    match ch {
        '0'..='9' => {
            value.push(ch);
            true
        }
        '.' | ',' if !value.contains('.') => {
            value.push('.');
            true
        }
        _ => false,
    }
}

/// Which file operation a path prompt feeds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathPurpose {
    Export,
    Import,
}

/// Single-line file path input used for export and import.
#[derive(Clone, Debug)]
pub(crate) struct PathPrompt {
    pub(crate) purpose: PathPurpose,
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl PathPrompt {
    pub(crate) fn new(purpose: PathPurpose, initial: impl Into<String>) -> Self {
        Self {
            purpose,
            path: initial.into(),
            error: None,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.purpose {
            PathPurpose::Export => "Export to file",
            PathPurpose::Import => "Import from file",
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.path.push(ch);
            self.error = None;
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }
}

/// What runs once the user answers "yes" to a confirmation dialog.
#[derive(Clone, Debug)]
pub(crate) enum PendingAction {
    Delete(u64),
    Import(String),
    ClearAll,
}

#[derive(Clone, Debug)]
pub(crate) struct ConfirmDialog {
    pub(crate) prompt: ConfirmPrompt,
    pub(crate) action: PendingAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut CalcForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn starts_with_defaults() {
        let form = CalcForm::default();
        assert_eq!(form.bar_length, "1750");
        assert_eq!(form.quantity, "1");
        assert!(form.segment_length.is_empty());
        assert_eq!(form.preview(), CalculationResult::ZERO);
    }

    #[test]
    fn preview_tracks_every_keystroke() {
        let mut form = CalcForm::default();
        form.active = FormField::SegmentLength;
        type_text(&mut form, "3");
        assert_eq!(form.preview().segments_per_bar, 583);
        type_text(&mut form, "00");
        assert_eq!(form.preview().segments_per_bar, 5);

        form.active = FormField::Quantity;
        form.backspace();
        type_text(&mut form, "4");
        let result = form.preview();
        assert_eq!(result.remainder_per_bar, 250.0);
        assert_eq!(result.total_remainder, 1000.0);
    }

    #[test]
    fn numeric_fields_filter_input() {
        let mut form = CalcForm::default();
        form.active = FormField::BarLength;
        form.bar_length.clear();
        type_text(&mut form, "12a,5.3");
        assert_eq!(form.bar_length, "12.53");

        form.active = FormField::Quantity;
        form.quantity.clear();
        assert!(!form.push_char('.'));
        assert!(!form.push_char('-'));
        assert!(form.push_char('7'));
        assert_eq!(form.quantity, "7");
    }

    #[test]
    fn name_accepts_cyrillic() {
        let mut form = CalcForm::default();
        type_text(&mut form, "Колонна-1");
        assert_eq!(form.name, "Колонна-1");
        assert_eq!(form.value_len(FormField::Name), 9);
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = CalcForm::default();
        for _ in 0..FormField::ALL.len() {
            form.focus_next();
        }
        assert_eq!(form.active, FormField::Name);
        form.focus_previous();
        assert_eq!(form.active, FormField::Quantity);
    }

    #[test]
    fn loads_record_values() {
        let record = Record {
            id: 1,
            name: "Балка".to_string(),
            rebar_length: 11700.0,
            segment_length: 2500.5,
            quantity: 3,
            segments: 4,
            remainder: 1698.0,
            total_remainder: 5094.0,
            date: String::new(),
        };
        let form = CalcForm::from_record(&record);
        assert_eq!(form.bar_length, "11700");
        assert_eq!(form.segment_length, "2500.5");
        assert_eq!(form.quantity, "3");
        assert_eq!(form.input(), record.input());
    }
}
