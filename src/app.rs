use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use tracing::{error, info, warn};

use crate::board::Board;
use crate::config::Config;
use crate::filter::Filter;
use crate::overlays::{
    ConfirmAction, ConfirmOverlay, PromptAction, PromptKind, PromptOverlay, TaskFormAction,
    TaskFormOverlay,
};
use crate::panels::{BoardPanel, BoardView, KeyHandleResult};
use crate::store::{self, KeyValueStore};
use crate::task::{Quadrant, TaskDraft};

/// At most one modal is open at a time; it receives every key.
pub enum Overlay {
    Form(TaskFormOverlay),
    Prompt(PromptOverlay),
    Confirm(ConfirmOverlay),
    Error(String),
    Help,
}

pub struct App {
    pub should_quit: bool,
    pub board_panel: BoardPanel,
    pub filter: Filter,
    pub overlay: Option<Overlay>,
    /// One-shot message for the footer, cleared on the next key.
    pub status: Option<String>,
    board: Board,
    store: Box<dyn KeyValueStore>,
    storage_key: String,
    export_dir: PathBuf,
    today: NaiveDate,
}

impl App {
    pub fn new(store: Box<dyn KeyValueStore>, config: &Config) -> Self {
        let board = store::load_board(store.as_ref(), &config.storage_key);
        info!(tasks = board.total(), key = %config.storage_key, "loaded board");
        Self {
            should_quit: false,
            board_panel: BoardPanel::default(),
            filter: Filter {
                hide_completed: config.hide_completed,
                ..Filter::default()
            },
            overlay: None,
            status: None,
            board,
            store,
            storage_key: config.storage_key.clone(),
            export_dir: config.export_dir.clone(),
            today: Local::now().date_naive(),
        }
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub fn render_board(&mut self, frame: &mut Frame, area: Rect) {
        let view = BoardView {
            board: &self.board,
            filter: &self.filter,
            today: self.today,
        };
        self.board_panel
            .render(frame, area, self.overlay.is_none(), &view);
    }

    pub fn tick(&mut self) {
        // Keeps due labels right across midnight.
        self.today = Local::now().date_naive();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;

        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        // A grabbed task owns the keyboard until dropped or cancelled.
        if self.board_panel.is_dragging() {
            self.forward_to_panel(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.overlay = Some(Overlay::Help),
            KeyCode::Char('n') => self.open_new_form(Quadrant::Do),
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(q) = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(Quadrant::from_number)
                {
                    self.open_new_form(q);
                }
            }
            KeyCode::Char('/') => {
                self.overlay = Some(Overlay::Prompt(PromptOverlay::new(
                    PromptKind::Search,
                    self.filter.query.clone(),
                )));
            }
            KeyCode::Char('f') => {
                self.filter.bucket = self.filter.bucket.cycle();
                self.status = Some(format!("Due filter: {}", self.filter.bucket.label()));
            }
            KeyCode::Char('H') => {
                self.filter.hide_completed = !self.filter.hide_completed;
                self.status = Some(
                    if self.filter.hide_completed {
                        "Hiding completed tasks"
                    } else {
                        "Showing completed tasks"
                    }
                    .to_string(),
                );
            }
            KeyCode::Char('E') => {
                let path = self.export_dir.join(store::default_export_name(self.today));
                self.overlay = Some(Overlay::Prompt(PromptOverlay::new(
                    PromptKind::Export,
                    path.display().to_string(),
                )));
            }
            KeyCode::Char('I') => {
                self.overlay = Some(Overlay::Prompt(PromptOverlay::new(PromptKind::Import, "")));
            }
            KeyCode::Char('C') => {
                self.overlay = Some(Overlay::Confirm(ConfirmOverlay::new("Clear all tasks?")));
            }
            KeyCode::Esc if !self.filter.query.is_empty() => self.filter.query.clear(),
            _ => self.forward_to_panel(key),
        }
    }

    fn forward_to_panel(&mut self, key: KeyEvent) {
        let result =
            self.board_panel
                .handle_key(key, &mut self.board, &self.filter, self.today);
        match result {
            KeyHandleResult::Changed => self.persist(),
            KeyHandleResult::Edit(id) => self.open_edit_form(&id),
            KeyHandleResult::AddTask(q) => self.open_new_form(q),
            KeyHandleResult::Consumed | KeyHandleResult::Ignored => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        match overlay {
            Overlay::Help | Overlay::Error(_) => self.overlay = None,
            Overlay::Form(form) => match form.handle_key(key) {
                TaskFormAction::Consumed => {}
                TaskFormAction::Dismiss => self.overlay = None,
                TaskFormAction::Submit {
                    id,
                    draft,
                    quadrant,
                } => {
                    self.overlay = None;
                    self.save_form(id, draft, quadrant);
                }
            },
            Overlay::Prompt(prompt) => {
                let kind = prompt.kind;
                match prompt.handle_key(key) {
                    PromptAction::Consumed => {}
                    PromptAction::Edited => {
                        if kind == PromptKind::Search {
                            self.filter.query = prompt.value().to_string();
                        }
                    }
                    PromptAction::Dismiss => {
                        if kind == PromptKind::Search {
                            self.filter.query.clear();
                        }
                        self.overlay = None;
                    }
                    PromptAction::Submit(value) => {
                        self.overlay = None;
                        self.submit_prompt(kind, value);
                    }
                }
            }
            Overlay::Confirm(confirm) => match confirm.handle_key(key) {
                ConfirmAction::Consumed => {}
                ConfirmAction::No => self.overlay = None,
                ConfirmAction::Yes => {
                    self.overlay = None;
                    self.clear_all();
                }
            },
        }
    }

    fn open_new_form(&mut self, quadrant: Quadrant) {
        self.overlay = Some(Overlay::Form(TaskFormOverlay::new_task(quadrant)));
    }

    fn open_edit_form(&mut self, id: &str) {
        if let Some((quadrant, _, task)) = self.board.find(id) {
            self.overlay = Some(Overlay::Form(TaskFormOverlay::edit_task(task, quadrant)));
        }
    }

    fn save_form(&mut self, id: Option<String>, draft: TaskDraft, quadrant: Quadrant) {
        let target = match id {
            Some(id) => self.board.update(&id, draft, quadrant).then_some(id),
            None => self.board.add(draft, quadrant),
        };
        if let Some(id) = target {
            self.persist();
            let view = BoardView {
                board: &self.board,
                filter: &self.filter,
                today: self.today,
            };
            self.board_panel.focus_task(&id, &view);
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, value: String) {
        match kind {
            PromptKind::Search => self.filter.query = value,
            PromptKind::Export => self.export(value),
            PromptKind::Import => self.import(value),
        }
    }

    fn export(&mut self, path: String) {
        if path.is_empty() {
            return;
        }
        let path = PathBuf::from(path);
        match store::export_json(&self.board, &path) {
            Ok(()) => {
                self.status = Some(format!(
                    "Exported {} tasks to {}",
                    self.board.total(),
                    path.display()
                ));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "export failed");
                self.overlay = Some(Overlay::Error(format!("Could not export file: {e}")));
            }
        }
    }

    fn import(&mut self, path: String) {
        if path.is_empty() {
            return;
        }
        let path = PathBuf::from(path);
        match store::import_json(&path) {
            Ok(board) => {
                self.board.replace(board);
                self.persist();
                self.status = Some(format!("Imported {} tasks", self.board.total()));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import failed");
                self.overlay = Some(Overlay::Error("Could not import file".to_string()));
            }
        }
    }

    fn clear_all(&mut self) {
        self.board.clear();
        if let Err(e) = store::clear_board(self.store.as_ref(), &self.storage_key) {
            error!(error = %e, "failed to clear stored board");
            self.overlay = Some(Overlay::Error(format!("Could not clear storage: {e}")));
        } else {
            self.status = Some("Cleared all tasks".to_string());
        }
    }

    /// Serialize the whole board after every mutation.
    fn persist(&mut self) {
        if let Err(e) = store::save_board(self.store.as_ref(), &self.storage_key, &self.board) {
            error!(error = %e, "failed to save board");
            self.overlay = Some(Overlay::Error(format!("Could not save tasks: {e}")));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::store::MemoryStore;

    const KEY: &str = "pmatrix-v1";

    fn app() -> App {
        App::new(Box::new(MemoryStore::default()), &Config::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn stored(app: &App) -> Board {
        store::load_board(app.store.as_ref(), KEY)
    }

    fn titles(board: &Board, q: Quadrant) -> Vec<&str> {
        board.tasks(q).iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn loads_existing_board_on_start() {
        let store = MemoryStore::default();
        let mut board = Board::new();
        board.add(TaskDraft::new("persisted"), Quadrant::Schedule);
        store::save_board(&store, KEY, &board).unwrap();

        let app = App::new(Box::new(store), &Config::default());
        assert_eq!(titles(app.board(), Quadrant::Schedule), ["persisted"]);
    }

    #[test]
    fn new_task_via_form_is_saved() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        assert!(matches!(app.overlay, Some(Overlay::Form(_))));
        type_str(&mut app, "Answer email");
        press(&mut app, KeyCode::Enter);

        assert!(app.overlay.is_none());
        assert_eq!(titles(app.board(), Quadrant::Delegate), ["Answer email"]);
        assert_eq!(stored(&app), *app.board());
        assert_eq!(app.board_panel.focused_quadrant(), Quadrant::Delegate);
    }

    #[test]
    fn edit_updates_title_and_persists() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Draft");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " v2");
        press(&mut app, KeyCode::Enter);

        assert_eq!(titles(app.board(), Quadrant::Do), ["Draft v2"]);
        assert_eq!(titles(&stored(&app), Quadrant::Do), ["Draft v2"]);
    }

    #[test]
    fn drag_between_quadrants_persists() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Move me");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('g'));
        // Digits aim the drag instead of opening the form.
        press(&mut app, KeyCode::Char('2'));
        assert!(app.overlay.is_none());
        press(&mut app, KeyCode::Enter);

        assert_eq!(titles(app.board(), Quadrant::Schedule), ["Move me"]);
        assert_eq!(titles(&stored(&app), Quadrant::Schedule), ["Move me"]);
    }

    #[test]
    fn toggle_and_delete_persist() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Tick");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('x'));
        assert!(stored(&app).tasks(Quadrant::Do)[0].done);

        press(&mut app, KeyCode::Char('d'));
        assert!(stored(&app).is_empty());
    }

    #[test]
    fn search_filters_live_and_escape_clears() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "rep");
        assert_eq!(app.filter.query, "rep");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.filter.query, "rep");
        assert!(app.overlay.is_none());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.filter.query, "");
    }

    #[test]
    fn filter_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter.bucket, crate::filter::DueBucket::Overdue);
        press(&mut app, KeyCode::Char('H'));
        assert!(app.filter.hide_completed);
        assert!(app.status.is_some());
    }

    #[test]
    fn clear_all_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Keep?");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.board().total(), 1);

        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.board().is_empty());
        assert_eq!(app.store.get(KEY).unwrap(), None);
    }

    #[test]
    fn export_then_import_replaces_board() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");

        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Exported");
        press(&mut app, KeyCode::Enter);
        app.submit_prompt(PromptKind::Export, path.display().to_string());
        assert!(path.exists());

        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Extra");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board().total(), 2);

        app.submit_prompt(PromptKind::Import, path.display().to_string());
        assert_eq!(titles(app.board(), Quadrant::Do), ["Exported"]);
        assert_eq!(titles(&stored(&app), Quadrant::Do), ["Exported"]);
    }

    #[test]
    fn failed_import_shows_error_and_keeps_board() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ nope").unwrap();

        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "Safe");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('I'));
        type_str(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.overlay, Some(Overlay::Error(ref m)) if m == "Could not import file"));
        assert_eq!(titles(app.board(), Quadrant::Do), ["Safe"]);

        press(&mut app, KeyCode::Char('z'));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn help_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.overlay, Some(Overlay::Help)));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
