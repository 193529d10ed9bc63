use std::fs;
use std::mem;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{error, info};

use crate::calc::format_number;
use crate::config::NAME_DISPLAY_WIDTH;
use crate::db::KeyValueStore;
use crate::models::{Record, SortKey, Theme};
use crate::records::{
    export_file_name, parse_document, ConfirmPrompt, Decision, ImportOutcome, RecordError,
    RecordStore, SaveOutcome,
};
use crate::settings::save_theme;

use super::forms::{CalcForm, ConfirmDialog, FormField, PathPrompt, PathPurpose, PendingAction};
use super::helpers::{centered_rect, surface_error, truncate_name};
use super::theme::Palette;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Four form rows, a spacer and the action hint, plus borders.
const CALCULATOR_HEIGHT: u16 = 8;
/// Column widths of the records table, in `SortKey::ALL` order.
const COLUMN_WIDTHS: [Constraint; 8] = [
    Constraint::Min(14),
    Constraint::Length(9),
    Constraint::Length(11),
    Constraint::Length(7),
    Constraint::Length(10),
    Constraint::Length(13),
    Constraint::Length(14),
    Constraint::Length(22),
];

/// Which pane receives plain key presses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Focus {
    Form,
    Records,
}

/// Modal overlays on top of the main screen.
enum Mode {
    Normal,
    EnteringPath(PathPrompt),
    Confirming(ConfirmDialog),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self, palette: &Palette) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(palette.success),
            StatusKind::Error => Style::default().fg(palette.error),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App<S: KeyValueStore> {
    store: RecordStore<S>,
    form: CalcForm,
    selected: usize,
    focus: Focus,
    mode: Mode,
    theme: Theme,
    sort_applied: bool,
    status: Option<StatusMessage>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: RecordStore<S>, theme: Theme) -> Self {
        Self {
            store,
            form: CalcForm::default(),
            selected: 0,
            focus: Focus::Form,
            mode: Mode::Normal,
            theme,
            sort_applied: false,
            status: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Route a plain key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => match self.focus {
                Focus::Form => self.handle_form_key(code),
                Focus::Records => self.handle_records_key(code, &mut exit),
            },
            Mode::EnteringPath(prompt) => self.handle_path_key(code, prompt),
            Mode::Confirming(dialog) => self.handle_confirm_key(code, dialog),
        };

        Ok(exit)
    }

    /// Ctrl shortcuts that work regardless of focus.
    pub fn handle_ctrl(&mut self, ch: char) -> Result<bool> {
        match ch {
            'c' => return Ok(true),
            'r' => {
                if matches!(self.mode, Mode::Normal) {
                    self.focus = match self.focus {
                        Focus::Form => Focus::Records,
                        Focus::Records => Focus::Form,
                    };
                }
            }
            't' => self.toggle_theme(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc => self.clear_or_cancel(),
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_previous(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => self.save_form(),
            KeyCode::Char(ch) => {
                if self.form.push_char(ch) {
                    self.form.error = None;
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_records_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Form,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.store.len().saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => self.begin_edit(),
            KeyCode::Char('d') | KeyCode::Delete => return self.request_delete(),
            KeyCode::Char('x') | KeyCode::Char('X') => return self.request_export(),
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.clear_status();
                return Mode::EnteringPath(PathPrompt::new(PathPurpose::Import, ""));
            }
            KeyCode::Char('C') => {
                self.clear_status();
                return Mode::Confirming(ConfirmDialog {
                    prompt: ConfirmPrompt::ClearAll,
                    action: PendingAction::ClearAll,
                });
            }
            KeyCode::Char('D') => self.toggle_theme(),
            KeyCode::Char(ch) => {
                if let Some(key) = SortKey::from_digit(ch) {
                    self.sort_by(key);
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_path_key(&mut self, code: KeyCode, mut prompt: PathPrompt) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Backspace => {
                prompt.backspace();
                Mode::EnteringPath(prompt)
            }
            KeyCode::Enter => {
                let path = prompt.path.trim().to_string();
                if path.is_empty() {
                    prompt.error = Some("A file path is required.".to_string());
                    return Mode::EnteringPath(prompt);
                }

                let outcome = match prompt.purpose {
                    PathPurpose::Export => self.export_to(&path).map(|count| {
                        self.set_status(
                            format!("Exported {count} record(s) to {path}."),
                            StatusKind::Info,
                        );
                        Mode::Normal
                    }),
                    PathPurpose::Import => self.prepare_import(&path),
                };

                match outcome {
                    Ok(mode) => mode,
                    Err(err) => {
                        let message = surface_error(&err);
                        prompt.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                        Mode::EnteringPath(prompt)
                    }
                }
            }
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
                Mode::EnteringPath(prompt)
            }
            _ => Mode::EnteringPath(prompt),
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode, dialog: ConfirmDialog) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.run_confirmed(dialog.action);
                Mode::Normal
            }
            _ => Mode::Confirming(dialog),
        }
    }

    fn clear_or_cancel(&mut self) {
        if self.store.editing().is_some() {
            self.store.cancel_edit();
            self.form.reset();
            self.set_status("Edit cancelled.", StatusKind::Info);
        } else {
            self.form.reset();
            self.clear_status();
        }
    }

    fn save_form(&mut self) {
        let input = self.form.input();
        let name = self.form.name.clone();

        match self.store.save(&name, &input) {
            Ok(SaveOutcome::Created(record)) => {
                self.form.reset();
                self.select_id(record.id);
                self.set_status(format!("Saved \"{}\".", record.name), StatusKind::Info);
            }
            Ok(SaveOutcome::Updated(record)) => {
                self.form.reset();
                self.select_id(record.id);
                self.set_status(format!("Updated \"{}\".", record.name), StatusKind::Info);
            }
            Ok(SaveOutcome::Missing) => {
                self.form.reset();
                self.set_status(
                    "The record being edited no longer exists.",
                    StatusKind::Error,
                );
            }
            Err(err) => {
                let message = err.to_string();
                self.form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn begin_edit(&mut self) {
        let Some(id) = self.selected_record().map(|record| record.id) else {
            self.set_status("No record selected to edit.", StatusKind::Error);
            return;
        };

        if let Some(record) = self.store.begin_edit(id) {
            self.form = CalcForm::from_record(record);
            self.focus = Focus::Form;
            let message = format!("Editing \"{}\".", self.form.name);
            self.set_status(message, StatusKind::Info);
        }
    }

    fn request_delete(&mut self) -> Mode {
        let target = self
            .selected_record()
            .map(|record| (record.id, record.name.clone()));

        match target {
            Some((id, name)) => {
                self.clear_status();
                Mode::Confirming(ConfirmDialog {
                    prompt: ConfirmPrompt::DeleteRecord { name },
                    action: PendingAction::Delete(id),
                })
            }
            None => {
                self.set_status("No record selected to delete.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn request_export(&mut self) -> Mode {
        if self.store.is_empty() {
            self.set_status(RecordError::NothingToExport.to_string(), StatusKind::Error);
            return Mode::Normal;
        }
        self.clear_status();
        let default_name = export_file_name(Local::now().date_naive());
        Mode::EnteringPath(PathPrompt::new(PathPurpose::Export, default_name))
    }

    fn export_to(&mut self, path: &str) -> Result<usize> {
        let document = self
            .store
            .export_all()
            .map_err(|err| anyhow!(err.to_string()))?;
        fs::write(path, document).with_context(|| format!("failed to write {path}"))?;
        info!(path, "wrote export file");
        Ok(self.store.len())
    }

    /// Read and validate the file, then ask before merging.
    fn prepare_import(&mut self, path: &str) -> Result<Mode> {
        let document =
            fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        let entries = parse_document(&document).map_err(|err| anyhow!(err.to_string()))?;

        self.clear_status();
        Ok(Mode::Confirming(ConfirmDialog {
            prompt: ConfirmPrompt::ImportRecords {
                count: entries.len(),
            },
            action: PendingAction::Import(document),
        }))
    }

    fn run_confirmed(&mut self, action: PendingAction) {
        let was_editing = self.store.editing();

        match action {
            PendingAction::Delete(id) => match self.store.delete(id, Decision::Yes) {
                Ok(true) => {
                    if was_editing == Some(id) {
                        self.form.reset();
                    }
                    self.clamp_selection();
                    self.set_status("Record deleted.", StatusKind::Info);
                }
                Ok(false) => self.set_status("Record no longer exists.", StatusKind::Error),
                Err(err) => self.report(err),
            },
            PendingAction::Import(document) => {
                match self.store.import_merge(&document, Decision::Yes) {
                    Ok(ImportOutcome::Imported(count)) => {
                        self.set_status(format!("Imported {count} record(s)."), StatusKind::Info)
                    }
                    Ok(ImportOutcome::Declined) => {
                        self.set_status("Import cancelled.", StatusKind::Info)
                    }
                    Err(err) => self.report(err),
                }
            }
            PendingAction::ClearAll => match self.store.clear_all(Decision::Yes) {
                Ok(_) => {
                    if was_editing.is_some() {
                        self.form.reset();
                    }
                    self.selected = 0;
                    self.set_status("All saved calculations deleted.", StatusKind::Info);
                }
                Err(err) => self.report(err),
            },
        }
    }

    fn sort_by(&mut self, key: SortKey) {
        match self.store.sort(key) {
            Ok(state) => {
                self.sort_applied = true;
                self.set_status(
                    format!("Sorted by {} {}", key.label(), state.direction.arrow()),
                    StatusKind::Info,
                );
            }
            Err(err) => self.report(err),
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        match save_theme(self.store.backend(), self.theme) {
            Ok(()) => self.set_status(
                format!("Theme: {}.", self.theme.as_str()),
                StatusKind::Info,
            ),
            Err(err) => {
                error!(error = %err, "failed to persist theme");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    fn report(&mut self, err: RecordError) {
        error!(error = %err, "record operation failed");
        self.set_status(err.to_string(), StatusKind::Error);
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn selected_record(&self) -> Option<&Record> {
        self.store.records().get(self.selected)
    }

    fn select_id(&mut self, id: u64) {
        if let Some(index) = self.store.records().iter().position(|r| r.id == id) {
            self.selected = index;
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.store.len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.store.len() {
            self.selected = self.store.len().saturating_sub(1);
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let palette = Palette::for_theme(self.theme);
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
            area,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(CALCULATOR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_calculator(frame, chunks[0], &palette);
        self.draw_records(frame, chunks[1], &palette);
        self.draw_footer(frame, chunks[2], &palette);

        match &self.mode {
            Mode::EnteringPath(prompt) => self.draw_path_prompt(frame, area, prompt, &palette),
            Mode::Confirming(dialog) => self.draw_confirm(frame, area, dialog, &palette),
            Mode::Normal => {}
        }
    }

    fn pane_block(&self, title: String, focused: bool, palette: &Palette) -> Block<'static> {
        let border = if focused {
            Style::default().fg(palette.active)
        } else {
            Style::default().fg(palette.border)
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border)
    }

    fn draw_calculator(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let editing = self.store.editing().is_some();
        let form_focused = self.focus == Focus::Form && matches!(self.mode, Mode::Normal);
        let title = if editing { "Edit Record" } else { "Calculator" };
        let block = self.pane_block(title.to_string(), form_focused, palette);
        let inner = block.inner(halves[0]);
        frame.render_widget(block, halves[0]);

        let mut lines: Vec<Line> = FormField::ALL
            .iter()
            .map(|field| self.form.build_line(*field, form_focused, palette))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &self.form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(palette.error),
            )));
        } else {
            let (save, clear) = if editing {
                ("Update", "Cancel")
            } else {
                ("Save", "Clear")
            };
            let key_style = Style::default()
                .fg(palette.key)
                .add_modifier(Modifier::BOLD);
            lines.push(Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(format!(" {save}   ")),
                Span::styled("[Esc]", key_style),
                Span::raw(format!(" {clear}")),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if form_focused {
            let field = self.form.active;
            let row = FormField::ALL
                .iter()
                .position(|candidate| *candidate == field)
                .unwrap_or_default() as u16;
            let prefix = field.label().len() as u16 + 2;
            frame.set_cursor_position((
                inner.x + prefix + self.form.value_len(field) as u16,
                inner.y + row,
            ));
        }

        let result = self.form.preview();
        let value_style = Style::default()
            .fg(palette.active)
            .add_modifier(Modifier::BOLD);
        let result_lines = vec![
            Line::from(vec![
                Span::raw("Pieces per bar:    "),
                Span::styled(result.segments_per_bar.to_string(), value_style),
            ]),
            Line::from(vec![
                Span::raw("Remainder per bar: "),
                Span::styled(format_number(result.remainder_per_bar), value_style),
            ]),
            Line::from(vec![
                Span::raw("Total remainder:   "),
                Span::styled(format_number(result.total_remainder), value_style),
            ]),
        ];
        let result_block = self.pane_block("Result".to_string(), false, palette);
        frame.render_widget(Paragraph::new(result_lines).block(result_block), halves[1]);
    }

    fn draw_records(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let focused = self.focus == Focus::Records && matches!(self.mode, Mode::Normal);
        let title = format!("Saved calculations ({})", self.store.len());
        let block = self.pane_block(title, focused, palette);

        if self.store.is_empty() {
            let message = Paragraph::new("No saved calculations yet.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted))
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let sort = self.store.sort_state();
        let header_style = Style::default()
            .fg(palette.key)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(SortKey::ALL.iter().enumerate().map(|(index, key)| {
            let arrow = if self.sort_applied && sort.key == *key {
                sort.direction.arrow()
            } else {
                "↕"
            };
            Cell::from(format!("{} {} {}", index + 1, key.label(), arrow))
        }))
        .style(header_style);

        let rows = self.store.records().iter().map(|record| {
            Row::new(vec![
                Cell::from(truncate_name(&record.name, NAME_DISPLAY_WIDTH)),
                Cell::from(format_number(record.rebar_length)),
                Cell::from(format_number(record.segment_length)),
                Cell::from(record.quantity.to_string()),
                Cell::from(record.segments.to_string()),
                Cell::from(format_number(record.remainder)),
                Cell::from(format_number(record.total_remainder)),
                Cell::from(record.date.clone()),
            ])
        });

        let highlight = if focused {
            Style::default()
                .bg(palette.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(header)
            .block(block)
            .row_highlight_style(highlight)
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(palette.border));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(
                status.text.clone(),
                status.kind.style(palette),
            )])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions(palette);

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self, palette: &Palette) -> Line<'static> {
        let key_style = Style::default()
            .fg(palette.key)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.mode, self.focus) {
            (Mode::Confirming(_), _) => &[("[Y]", " Confirm   "), ("[N/Esc]", " Cancel")],
            (Mode::EnteringPath(_), _) => &[("[Enter]", " Confirm   "), ("[Esc]", " Cancel")],
            (Mode::Normal, Focus::Form) => &[
                ("[Tab/↑↓]", " Field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Clear   "),
                ("[Ctrl+R]", " Records   "),
                ("[Ctrl+T]", " Theme   "),
                ("[Ctrl+C]", " Quit"),
            ],
            (Mode::Normal, Focus::Records) => &[
                ("[↑↓]", " Select   "),
                ("[e]", " Edit   "),
                ("[d]", " Delete   "),
                ("[1-8]", " Sort   "),
                ("[x]", " Export   "),
                ("[i]", " Import   "),
                ("[C]", " Clear all   "),
                ("[D]", " Theme   "),
                ("[Esc]", " Form   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            hints
                .iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_path_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt, palette: &Palette) {
        let popup_area = centered_rect(70, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(prompt.title())
            .borders(Borders::ALL)
            .style(Style::default().bg(palette.background).fg(palette.text));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Path: "),
                Span::styled(prompt.path.clone(), Style::default().fg(palette.active)),
            ]),
            Line::from(""),
        ];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(palette.error),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to confirm • Esc to cancel",
                Style::default().fg(palette.muted),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "Path: ".len() as u16 + prompt.path.chars().count() as u16,
            inner.y,
        ));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, dialog: &ConfirmDialog, palette: &Palette) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(dialog.prompt.title())
            .borders(Borders::ALL)
            .style(Style::default().bg(palette.background).fg(palette.text));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let lines = vec![
            Line::from(dialog.prompt.message()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(palette.muted),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
