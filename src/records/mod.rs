//! The record store: owns the saved calculations, the active sort and the edit
//! session, and mirrors every change into a [`KeyValueStore`].
//!
//! Each mutation builds the next collection, writes it out, and only then
//! swaps it in. A failed write leaves the in-memory state untouched.

mod confirm;
mod error;
mod ids;
mod sort;
mod transfer;

use std::collections::HashSet;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::calc::compute;
use crate::config::RECORDS_KEY;
use crate::db::KeyValueStore;
use crate::models::{CalculationInput, CalculationResult, Record, SortDirection, SortKey, SortState};

pub use confirm::{Confirm, ConfirmPrompt, Decision};
pub use error::RecordError;
pub use ids::IdGenerator;
pub use sort::{compare, compare_names, parse_date, sort_records, DATE_FORMAT};
pub use transfer::{export_file_name, parse_document, ImportedRecord};

pub type Result<T> = std::result::Result<T, RecordError>;

/// Source of "now" for ids and record dates.
pub type Clock = Box<dyn Fn() -> DateTime<Local>>;

/// What a save from the form turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Created(Record),
    Updated(Record),
    /// The record being edited disappeared; nothing was written.
    Missing,
}

/// Result of an import attempt that got past parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported(usize),
    Declined,
}

pub struct RecordStore<S: KeyValueStore> {
    backend: S,
    records: Vec<Record>,
    sort: SortState,
    editing: Option<u64>,
    ids: IdGenerator,
    clock: Clock,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Read the collection from `backend`. A missing entry or unreadable JSON
    /// starts an empty collection; backend failures are returned.
    pub fn load(backend: S) -> Result<Self> {
        Self::load_with_clock(backend, Box::new(Local::now))
    }

    pub fn load_with_clock(backend: S, clock: Clock) -> Result<Self> {
        let mut store = Self {
            backend,
            records: Vec::new(),
            sort: SortState::default(),
            editing: None,
            ids: IdGenerator::default(),
            clock,
        };

        let Some(raw) = store.backend.get(RECORDS_KEY)? else {
            return Ok(store);
        };

        match parse_document(&raw) {
            Ok(entries) => {
                let mut taken = HashSet::new();
                let now = store.now_millis();
                let stored_ids: Vec<Option<u64>> = entries.iter().map(|entry| entry.id).collect();
                let records: Vec<Record> = entries
                    .into_iter()
                    .map(|entry| store.settle_id(entry, &mut taken, now))
                    .collect();
                let reassigned = records
                    .iter()
                    .zip(&stored_ids)
                    .filter(|(record, stored)| **stored != Some(record.id))
                    .count();
                info!(count = records.len(), "loaded saved records");

                if reassigned > 0 {
                    // repaired ids stay in memory even when the write fails
                    if let Err(err) = store.commit(records.clone()) {
                        warn!(error = %err, reassigned, "could not persist repaired ids");
                        store.records = records;
                    } else {
                        info!(reassigned, "persisted repaired record ids");
                    }
                } else {
                    store.records = records;
                }
            }
            Err(err) => {
                warn!(error = %err, "ignoring unreadable saved records");
            }
        }

        Ok(store)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Validate the form values and append a new record.
    pub fn create(&mut self, name: &str, input: &CalculationInput) -> Result<Record> {
        let (name, result) = validate(name, input)?;
        let now = (self.clock)();
        let id = self.ids.next(millis(&now));

        let record = Record {
            id,
            name,
            rebar_length: input.bar_length,
            segment_length: input.segment_length,
            quantity: input.quantity,
            segments: result.segments_per_bar,
            remainder: result.remainder_per_bar,
            total_remainder: result.total_remainder,
            date: now.format(DATE_FORMAT).to_string(),
        };

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;

        info!(id, name = %record.name, "created record");
        Ok(record)
    }

    /// Rewrite a record in place, keeping its id and creation date. An unknown
    /// id is a no-op and yields `None`.
    pub fn update(&mut self, id: u64, name: &str, input: &CalculationInput) -> Result<Option<Record>> {
        let (name, result) = validate(name, input)?;
        let Some(index) = self.position(id) else {
            debug!(id, "update skipped, record not found");
            return Ok(None);
        };

        let mut next = self.records.clone();
        let record = &mut next[index];
        record.name = name;
        record.rebar_length = input.bar_length;
        record.segment_length = input.segment_length;
        record.quantity = input.quantity;
        record.segments = result.segments_per_bar;
        record.remainder = result.remainder_per_bar;
        record.total_remainder = result.total_remainder;
        let updated = record.clone();

        self.commit(next)?;

        info!(id, "updated record");
        Ok(Some(updated))
    }

    /// Remove a record after confirmation. Returns whether anything was removed.
    pub fn delete(&mut self, id: u64, mut confirm: impl Confirm) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let prompt = ConfirmPrompt::DeleteRecord {
            name: self.records[index].name.clone(),
        };
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }

        let mut next = self.records.clone();
        next.remove(index);
        self.commit(next)?;

        if self.editing == Some(id) {
            self.editing = None;
        }
        info!(id, "deleted record");
        Ok(true)
    }

    /// Sort by `key`, flipping the direction when it is already the active
    /// column and starting ascending otherwise. The new order is persisted.
    pub fn sort(&mut self, key: SortKey) -> Result<SortState> {
        let direction = if self.sort.key == key {
            self.sort.direction.flipped()
        } else {
            SortDirection::Ascending
        };
        self.sort_by(key, direction)?;
        Ok(self.sort)
    }

    /// Apply an explicit sort state and persist the resulting order.
    pub fn sort_by(&mut self, key: SortKey, direction: SortDirection) -> Result<()> {
        let state = SortState { key, direction };
        let mut next = self.records.clone();
        sort_records(&mut next, state);
        self.commit(next)?;
        self.sort = state;
        debug!(?key, ?direction, "sorted records");
        Ok(())
    }

    /// Serialize the whole collection for an export file.
    pub fn export_all(&self) -> Result<String> {
        if self.records.is_empty() {
            return Err(RecordError::NothingToExport);
        }
        let document = transfer::encode_pretty(&self.records)?;
        info!(count = self.records.len(), "exported records");
        Ok(document)
    }

    /// Append every entry of `document` after confirmation. Ids that are
    /// missing or already taken are replaced with fresh ones; nothing else is
    /// deduplicated.
    pub fn import_merge(&mut self, document: &str, mut confirm: impl Confirm) -> Result<ImportOutcome> {
        let entries = parse_document(document)?;
        let count = entries.len();

        if !confirm.confirm(&ConfirmPrompt::ImportRecords { count }) {
            return Ok(ImportOutcome::Declined);
        }

        let ids_before = self.ids.clone();
        let mut taken: HashSet<u64> = self.records.iter().map(|record| record.id).collect();
        let now = self.now_millis();
        let mut next = self.records.clone();
        next.extend(
            entries
                .into_iter()
                .map(|entry| self.settle_id(entry, &mut taken, now)),
        );

        if let Err(err) = self.commit(next) {
            self.ids = ids_before;
            return Err(err);
        }

        info!(count, "imported records");
        Ok(ImportOutcome::Imported(count))
    }

    /// Drop every record and the persisted entry after confirmation.
    pub fn clear_all(&mut self, mut confirm: impl Confirm) -> Result<bool> {
        if !confirm.confirm(&ConfirmPrompt::ClearAll) {
            return Ok(false);
        }

        self.backend.remove(RECORDS_KEY)?;
        self.records.clear();
        self.editing = None;
        info!("cleared all records");
        Ok(true)
    }

    /// Enter edit mode for `id`, returning the record to load into the form.
    /// Editing another record simply retargets the session.
    pub fn begin_edit(&mut self, id: u64) -> Option<&Record> {
        let index = self.position(id)?;
        self.editing = Some(id);
        Some(&self.records[index])
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<u64> {
        self.editing
    }

    /// Save the form: update the record under edit, or create a new one.
    /// A validation failure keeps the edit session open.
    pub fn save(&mut self, name: &str, input: &CalculationInput) -> Result<SaveOutcome> {
        match self.editing {
            Some(id) => {
                let outcome = match self.update(id, name, input)? {
                    Some(record) => SaveOutcome::Updated(record),
                    None => SaveOutcome::Missing,
                };
                self.editing = None;
                Ok(outcome)
            }
            None => self.create(name, input).map(SaveOutcome::Created),
        }
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    fn now_millis(&self) -> u64 {
        millis(&(self.clock)())
    }

    /// Keep an incoming id when it is free, otherwise mint a new one.
    fn settle_id(&mut self, entry: ImportedRecord, taken: &mut HashSet<u64>, now: u64) -> Record {
        let id = match entry.id {
            Some(id) if !taken.contains(&id) => {
                self.ids.observe(id);
                id
            }
            _ => self.ids.next(now),
        };
        taken.insert(id);
        entry.into_record(id)
    }

    fn commit(&mut self, next: Vec<Record>) -> Result<()> {
        let encoded = transfer::encode_compact(&next)?;
        self.backend.set(RECORDS_KEY, &encoded)?;
        self.records = next;
        Ok(())
    }
}

fn validate(name: &str, input: &CalculationInput) -> Result<(String, CalculationResult)> {
    let name = name.trim();
    let positive = input.bar_length > 0.0 && input.segment_length > 0.0 && input.quantity > 0;
    if name.is_empty() || !positive {
        return Err(RecordError::MissingFields);
    }

    let result = compute(input);
    if result.is_zero() {
        return Err(RecordError::NoSegments);
    }
    Ok((name.to_string(), result))
}

fn millis(now: &DateTime<Local>) -> u64 {
    u64::try_from(now.timestamp_millis()).unwrap_or_default()
}
