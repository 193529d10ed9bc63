/// Destructive steps that need a yes/no answer before they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    DeleteRecord { name: String },
    ImportRecords { count: usize },
    ClearAll,
}

impl ConfirmPrompt {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmPrompt::DeleteRecord { .. } => "Confirm Removal",
            ConfirmPrompt::ImportRecords { .. } => "Confirm Import",
            ConfirmPrompt::ClearAll => "Confirm Clear",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmPrompt::DeleteRecord { name } => {
                format!("Are you sure you want to delete the record \"{name}\"?")
            }
            ConfirmPrompt::ImportRecords { count } => format!(
                "Import {count} record(s)? Existing records will be kept."
            ),
            ConfirmPrompt::ClearAll => {
                "Are you sure you want to delete all saved calculations? This cannot be undone."
                    .to_string()
            }
        }
    }
}

/// Caller-supplied answer to a [`ConfirmPrompt`].
pub trait Confirm {
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmPrompt) -> bool,
{
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

/// An answer collected ahead of time, e.g. from a dialog that already closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
}

impl Confirm for Decision {
    fn confirm(&mut self, _prompt: &ConfirmPrompt) -> bool {
        matches!(self, Decision::Yes)
    }
}
