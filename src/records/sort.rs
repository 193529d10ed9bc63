//! Record ordering. Numbers compare numerically, names with a Russian-aware
//! collation and dates chronologically, since the stored `DD.MM.YYYY` text
//! does not sort correctly as a string.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Record, SortDirection, SortKey, SortState};

/// Format used for the `date` field of new records.
pub const DATE_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";
/// Date-only variant written by older exports.
const DATE_ONLY_FORMAT: &str = "%d.%m.%Y";

/// Reorder `records` in place. The sort is stable.
pub fn sort_records(records: &mut [Record], state: SortState) {
    match state.direction {
        SortDirection::Ascending => records.sort_by(|a, b| compare(a, b, state.key)),
        SortDirection::Descending => records.sort_by(|a, b| compare(b, a, state.key)),
    }
}

/// Ascending comparison of two records on one column.
pub fn compare(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::RebarLength => a.rebar_length.total_cmp(&b.rebar_length),
        SortKey::SegmentLength => a.segment_length.total_cmp(&b.segment_length),
        SortKey::Quantity => a.quantity.cmp(&b.quantity),
        SortKey::Segments => a.segments.cmp(&b.segments),
        SortKey::Remainder => a.remainder.total_cmp(&b.remainder),
        SortKey::TotalRemainder => a.total_remainder.total_cmp(&b.total_remainder),
        SortKey::Date => parse_date(&a.date).cmp(&parse_date(&b.date)),
    }
}

/// Parse a record date. Unparseable text yields `None`, which orders first.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Russian alphabetical order, Cyrillic before Latin.
///
/// Letters are compared first with case ignored and `ё` read as `е`. Ties
/// then go to the unaccented `е`, then to lowercase, and finally to the raw
/// text so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| accent_key(a).cmp(accent_key(b)))
        .then_with(|| case_key(a).cmp(case_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(name: &str) -> impl Iterator<Item = (u8, u32)> + '_ {
    name.chars().flat_map(char::to_lowercase).map(collation_weight)
}

fn accent_key(name: &str) -> impl Iterator<Item = bool> + '_ {
    name.chars().flat_map(char::to_lowercase).map(|ch| ch == 'ё')
}

fn case_key(name: &str) -> impl Iterator<Item = bool> + '_ {
    name.chars().map(char::is_uppercase)
}

/// (script group, position within group)
fn collation_weight(ch: char) -> (u8, u32) {
    match ch {
        'ё' => (2, u32::from('е')),
        'а'..='я' => (2, u32::from(ch)),
        'a'..='z' => (3, u32::from(ch)),
        _ if ch.is_alphabetic() => (4, u32::from(ch)),
        // whitespace, digits and punctuation sort ahead of letters
        _ => (1, u32::from(ch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, name: &str, length: f64, date: &str) -> Record {
        Record {
            id,
            name: name.to_string(),
            rebar_length: length,
            segment_length: 100.0,
            quantity: 1,
            segments: (length / 100.0).floor() as u64,
            remainder: length % 100.0,
            total_remainder: length % 100.0,
            date: date.to_string(),
        }
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn numeric_columns_sort_numerically() {
        let mut records = vec![
            record(1, "a", 1000.0, ""),
            record(2, "b", 250.0, ""),
            record(3, "c", 12000.0, ""),
        ];
        sort_records(
            &mut records,
            SortState {
                key: SortKey::RebarLength,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&records), vec![2, 1, 3]);

        sort_records(
            &mut records,
            SortState {
                key: SortKey::RebarLength,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(ids(&records), vec![3, 1, 2]);
    }

    #[test]
    fn dates_sort_chronologically_not_lexically() {
        // lexically "02.01.2025" < "15.12.2024", chronologically the reverse
        let mut records = vec![
            record(1, "a", 100.0, "02.01.2025, 09:00:00"),
            record(2, "b", 100.0, "15.12.2024, 18:30:00"),
            record(3, "c", 100.0, "02.01.2025, 08:59:59"),
        ];
        sort_records(
            &mut records,
            SortState {
                key: SortKey::Date,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }

    #[test]
    fn date_only_and_garbage_dates() {
        assert_eq!(
            parse_date("05.03.2024"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_date("yesterday"), None);

        let mut records = vec![
            record(1, "a", 100.0, "05.03.2024"),
            record(2, "b", 100.0, "not a date"),
        ];
        sort_records(
            &mut records,
            SortState {
                key: SortKey::Date,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(ids(&records), vec![2, 1]);
    }

    #[test]
    fn russian_names_collate_alphabetically() {
        let mut names = vec!["Ёлка", "ель", "Жук", "Арка", "балка", "Zeta", "alpha", "10"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(
            names,
            vec!["10", "Арка", "балка", "Ёлка", "ель", "Жук", "alpha", "Zeta"]
        );
    }

    #[test]
    fn yo_is_a_variant_of_ye() {
        let mut names = vec!["ель", "Ёлка", "ёж", "еж"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["еж", "ёж", "Ёлка", "ель"]);
    }

    #[test]
    fn lowercase_wins_case_ties() {
        assert_eq!(compare_names("колонна", "Колонна"), Ordering::Less);
        assert_eq!(compare_names("Колонна", "колонна"), Ordering::Greater);
        assert_eq!(compare_names("Колонна", "колонна-1"), Ordering::Less);
        assert_eq!(compare_names("ёж", "Еж"), Ordering::Greater);
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let mut records = vec![
            record(1, "same", 100.0, ""),
            record(2, "same", 100.0, ""),
            record(3, "same", 100.0, ""),
        ];
        sort_records(
            &mut records,
            SortState {
                key: SortKey::Quantity,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(ids(&records), vec![1, 2, 3]);
    }
}
