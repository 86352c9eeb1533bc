//! Interactive session state shared by the grid, the chrome and the assembly runner

use crate::assembly::{check_output_name, AssembledDocument, AssemblyProgress, OutputTarget};
use crate::domain::{
    apply_manual_sort, AssemblyTicket, DiscoveryOptions, DragOver, DragReorder, DropOutcome,
    FileHandle, FileSelection, SelectionStore,
};
use crate::error::{PdfStackError, Result};
use std::path::{Path, PathBuf};

/// Kind of message shown in the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

/// A mouse press that may turn into a drag or a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    index: usize,
    on_thumbnail: bool,
    moved: bool,
}

/// What releasing the mouse button did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Released over a tile after moving; the drop was attempted
    Dropped(DropOutcome),
    /// Released without moving on a thumbnail
    Clicked(usize),
    /// Released outside any tile or with nothing pressed
    Cancelled,
}

/// Session state: the owned store plus the per-tile inputs drawn over it
pub struct App {
    store: SelectionStore,
    selection: FileSelection,
    drag: DragReorder,
    press: Option<Press>,
    hover: Option<usize>,
    /// Rank field text, one per tile in positional order
    ranks: Vec<String>,
    cursor: usize,
    source_paths: Vec<PathBuf>,
    discovery: DiscoveryOptions,
    pub output_name: String,
    pub output_dir: PathBuf,
    pub progress: AssemblyProgress,
    pub assembling: bool,
    pub last_output: Option<PathBuf>,
    pub status: Option<Status>,
    /// Failure waiting to be shown as a dialog
    notice: Option<String>,
}

impl App {
    pub fn new(selection: FileSelection, output_name: &str, output_dir: &Path) -> Self {
        let mut app = Self {
            store: SelectionStore::new(selection.files().to_vec()),
            selection,
            drag: DragReorder::new(),
            press: None,
            hover: None,
            ranks: Vec::new(),
            cursor: 0,
            source_paths: Vec::new(),
            discovery: DiscoveryOptions::default(),
            output_name: output_name.to_string(),
            output_dir: output_dir.to_path_buf(),
            progress: AssemblyProgress::default(),
            assembling: false,
            last_output: None,
            status: None,
            notice: None,
        };
        app.refresh();
        app
    }

    /// Remembers where the selection came from so it can be rescanned
    pub fn with_source(mut self, paths: Vec<PathBuf>, discovery: DiscoveryOptions) -> Self {
        self.source_paths = paths;
        self.discovery = discovery;
        self
    }

    pub fn tiles(&self) -> &[FileHandle] {
        self.store.as_slice()
    }

    pub fn tile_count(&self) -> usize {
        self.store.len()
    }

    pub fn rank(&self, index: usize) -> &str {
        self.ranks.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn summary(&self) -> String {
        self.selection.summary()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn dragging(&self) -> Option<usize> {
        self.drag.active_source()
    }

    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    pub fn is_locked(&self) -> bool {
        self.store.is_locked()
    }

    /// Re-derives everything drawn from the store: rank fields restart at
    /// 1..=n, the outer selection mirrors the order, stale gestures are dropped.
    fn refresh(&mut self) {
        self.ranks = (1..=self.store.len()).map(|n| n.to_string()).collect();
        self.selection.write_back(self.store.as_slice());
        self.hover = None;
        self.press = None;
        self.drag.drag_end();
        if self.cursor >= self.store.len() {
            self.cursor = self.store.len().saturating_sub(1);
        }
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Info,
            message: message.into(),
        });
    }

    pub fn report(&mut self, error: &PdfStackError) {
        tracing::warn!(error = %error, "operation failed");
        if error.is_blocking() {
            self.notice = Some(error.to_string());
        }
        self.status = Some(Status {
            kind: StatusKind::Error,
            message: error.to_string(),
        });
    }

    /// Takes the failure that still needs acknowledging, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Replaces the selection, e.g. after the user picks new files
    pub fn select_files(&mut self, selection: FileSelection) -> Result<()> {
        self.store.replace(selection.files().to_vec())?;
        self.selection = selection;
        self.cursor = 0;
        self.refresh();
        self.set_info(self.selection.summary());
        Ok(())
    }

    /// Re-runs discovery over the paths given on the command line
    pub fn rescan(&mut self) -> Result<()> {
        if self.store.is_locked() {
            return Err(PdfStackError::SelectionLocked);
        }
        let selection = FileSelection::scan(&self.source_paths, &self.discovery)?;
        self.select_files(selection)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.store.is_empty() {
            return;
        }
        let last = self.store.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn set_cursor(&mut self, index: usize) {
        if index < self.store.len() {
            self.cursor = index;
        }
    }

    pub fn begin_drag(&mut self, index: usize) {
        self.drag.drag_start(index);
    }

    pub fn drag_over(&mut self, index: usize) -> DragOver {
        let over = self.drag.drag_over(index);
        self.hover = (over == DragOver::Accept).then_some(index);
        over
    }

    /// Drops the dragged tile on `target`, refreshing the tiles on a swap
    pub fn drop_on(&mut self, target: usize) -> Result<DropOutcome> {
        self.hover = None;
        let outcome = self.drag.drop_on(&mut self.store, target)?;
        if let DropOutcome::Swapped { from, to } = outcome {
            self.refresh();
            self.cursor = to;
            self.set_info(format!("Swapped page {} and page {}", from + 1, to + 1));
        }
        Ok(outcome)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.drag_end();
        self.hover = None;
        self.press = None;
    }

    /// Keyboard gesture: pick up the cursor tile, or drop the held one on it
    pub fn toggle_pick_up(&mut self) -> Result<Option<DropOutcome>> {
        if self.drag.is_dragging() {
            let target = self.cursor;
            return self.drop_on(target).map(Some);
        }
        if !self.store.is_empty() {
            self.begin_drag(self.cursor);
            self.set_info(format!("Picked up page {}", self.cursor + 1));
        }
        Ok(None)
    }

    pub fn pointer_down(&mut self, index: usize, on_thumbnail: bool) {
        self.press = Some(Press {
            index,
            on_thumbnail,
            moved: false,
        });
        self.set_cursor(index);
        self.begin_drag(index);
    }

    pub fn pointer_drag(&mut self, over: Option<usize>) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        if over != Some(press.index) {
            press.moved = true;
        }
        match over {
            Some(index) => {
                self.drag_over(index);
            }
            None => self.hover = None,
        }
    }

    pub fn pointer_up(&mut self, target: Option<usize>) -> Result<PointerOutcome> {
        let press = self.press.take();

        match (press, target) {
            (Some(press), Some(index)) if !press.moved && index == press.index => {
                self.cancel_drag();
                if press.on_thumbnail {
                    Ok(PointerOutcome::Clicked(index))
                } else {
                    Ok(PointerOutcome::Cancelled)
                }
            }
            (Some(_), Some(index)) => self.drop_on(index).map(PointerOutcome::Dropped),
            _ => {
                self.cancel_drag();
                Ok(PointerOutcome::Cancelled)
            }
        }
    }

    pub fn push_rank_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '-') {
            return;
        }
        if let Some(rank) = self.ranks.get_mut(self.cursor) {
            rank.push(c);
        }
    }

    pub fn pop_rank_char(&mut self) {
        if let Some(rank) = self.ranks.get_mut(self.cursor) {
            rank.pop();
        }
    }

    /// Resorts by the rank fields; returns whether anything was applied
    pub fn apply_manual_sort(&mut self) -> Result<bool> {
        let applied = apply_manual_sort(&mut self.store, &self.ranks)?;
        if applied {
            self.refresh();
            self.set_info("Applied page ranks");
        }
        Ok(applied)
    }

    /// Applies pending ranks, then locks the store for assembly
    pub fn prepare_assembly(&mut self) -> Result<(AssemblyTicket, OutputTarget)> {
        self.apply_manual_sort()?;
        let ticket = self.store.begin_assembly()?;
        self.assembling = true;
        self.progress = AssemblyProgress::default();
        Ok((ticket, OutputTarget::new(&self.output_dir, &self.output_name)))
    }

    pub fn finish_assembly(&mut self, result: Result<AssembledDocument>) {
        self.assembling = false;
        match result {
            Ok(document) => {
                self.set_info(format!(
                    "Saved {} ({} pages)",
                    document.path.display(),
                    document.pages.len()
                ));
                self.last_output = Some(document.path);
            }
            Err(e) => {
                self.progress = AssemblyProgress::default();
                self.report(&e);
            }
        }
    }

    /// Keeps the previous name when `name` contains a path separator
    pub fn set_output_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        check_output_name(name)?;
        self.output_name = name.to_string();
        Ok(())
    }

    /// Name shown in the header; blank names fall back like the output target does
    pub fn display_output_name(&self) -> String {
        OutputTarget::new(&self.output_dir, &self.output_name).name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{handles, names};

    fn app(files: &[&str]) -> App {
        let mut selection = FileSelection::default();
        selection.write_back(&handles(files));
        App::new(selection, "document", Path::new("/out"))
    }

    fn ranks(app: &App) -> Vec<&str> {
        (0..app.tile_count()).map(|i| app.rank(i)).collect()
    }

    mod reorder_tests {
        use super::*;

        #[test]
        fn test_new_app_numbers_ranks() {
            let app = app(&["a", "b", "c"]);
            assert_eq!(ranks(&app), vec!["1", "2", "3"]);
            assert_eq!(app.summary(), "Selected 3 images");
        }

        #[test]
        fn test_drop_swaps_and_writes_back() {
            let mut app = app(&["a", "b", "c"]);
            app.begin_drag(0);
            assert_eq!(app.drag_over(2), DragOver::Accept);
            assert_eq!(app.hover(), Some(2));

            app.drop_on(2).unwrap();

            assert_eq!(names(app.tiles()), vec!["c", "b", "a"]);
            assert_eq!(names(app.selection().files()), vec!["c", "b", "a"]);
            assert_eq!(app.cursor(), 2);
            assert_eq!(app.hover(), None);
        }

        #[test]
        fn test_swap_resets_typed_ranks() {
            let mut app = app(&["a", "b"]);
            app.pop_rank_char();
            app.push_rank_char('9');
            assert_eq!(app.rank(0), "9");

            app.begin_drag(0);
            app.drop_on(1).unwrap();

            assert_eq!(ranks(&app), vec!["1", "2"]);
        }

        #[test]
        fn test_keyboard_pick_up_and_drop() {
            let mut app = app(&["a", "b", "c"]);

            assert_eq!(app.toggle_pick_up().unwrap(), None);
            assert_eq!(app.dragging(), Some(0));
            app.move_cursor(2);
            let outcome = app.toggle_pick_up().unwrap();

            assert_eq!(outcome, Some(DropOutcome::Swapped { from: 0, to: 2 }));
            assert_eq!(names(app.tiles()), vec!["c", "b", "a"]);
            assert_eq!(app.dragging(), None);
        }

        #[test]
        fn test_manual_sort_from_rank_fields() {
            let mut app = app(&["A", "B", "C"]);
            app.pop_rank_char();
            app.push_rank_char('2');
            app.move_cursor(1);
            app.pop_rank_char();
            app.push_rank_char('1');
            app.move_cursor(1);
            app.pop_rank_char();
            app.push_rank_char('2');

            assert!(app.apply_manual_sort().unwrap());

            assert_eq!(names(app.tiles()), vec!["B", "A", "C"]);
            assert_eq!(names(app.selection().files()), vec!["B", "A", "C"]);
            assert_eq!(ranks(&app), vec!["1", "2", "3"]);
        }

        #[test]
        fn test_rank_field_ignores_letters() {
            let mut app = app(&["a"]);
            app.push_rank_char('x');
            app.push_rank_char('4');
            assert_eq!(app.rank(0), "14");
        }

        #[test]
        fn test_cursor_is_clamped() {
            let mut app = app(&["a", "b"]);
            app.move_cursor(-5);
            assert_eq!(app.cursor(), 0);
            app.move_cursor(10);
            assert_eq!(app.cursor(), 1);
            app.set_cursor(7);
            assert_eq!(app.cursor(), 1);
        }

        #[test]
        fn test_select_files_replaces_store() {
            let mut app = app(&["a", "b", "c"]);
            app.move_cursor(2);
            let mut selection = FileSelection::default();
            selection.write_back(&handles(&["x"]));

            app.select_files(selection).unwrap();

            assert_eq!(names(app.tiles()), vec!["x"]);
            assert_eq!(ranks(&app), vec!["1"]);
            assert_eq!(app.cursor(), 0);
        }

        #[test]
        fn test_selection_mirrors_grid_until_rescan() {
            let temp_dir = tempfile::TempDir::new().unwrap();
            for name in ["a.png", "b.png"] {
                std::fs::write(temp_dir.path().join(name), b"").unwrap();
            }
            let paths = vec![temp_dir.path().to_path_buf()];
            let discovery = DiscoveryOptions::default();
            let selection = FileSelection::scan(&paths, &discovery).unwrap();
            let mut app = App::new(selection, "document", Path::new("/out"))
                .with_source(paths, discovery);

            app.begin_drag(0);
            app.drop_on(1).unwrap();
            assert_eq!(names(app.selection().files()), vec!["b.png", "a.png"]);
            assert_eq!(names(app.selection().files()), names(app.tiles()));

            app.rescan().unwrap();
            assert_eq!(names(app.selection().files()), vec!["a.png", "b.png"]);
            assert_eq!(names(app.tiles()), vec!["a.png", "b.png"]);
        }
    }

    mod pointer_tests {
        use super::*;

        #[test]
        fn test_press_drag_release_swaps() {
            let mut app = app(&["a", "b", "c"]);

            app.pointer_down(0, true);
            app.pointer_drag(Some(1));
            app.pointer_drag(Some(2));
            let outcome = app.pointer_up(Some(2)).unwrap();

            assert_eq!(
                outcome,
                PointerOutcome::Dropped(DropOutcome::Swapped { from: 0, to: 2 })
            );
            assert_eq!(names(app.tiles()), vec!["c", "b", "a"]);
        }

        #[test]
        fn test_click_on_thumbnail_opens_image() {
            let mut app = app(&["a", "b"]);

            app.pointer_down(1, true);
            let outcome = app.pointer_up(Some(1)).unwrap();

            assert_eq!(outcome, PointerOutcome::Clicked(1));
            assert_eq!(app.dragging(), None);
            assert_eq!(names(app.tiles()), vec!["a", "b"]);
        }

        #[test]
        fn test_click_on_tile_label_only_selects() {
            let mut app = app(&["a", "b"]);

            app.pointer_down(1, false);

            assert_eq!(app.pointer_up(Some(1)).unwrap(), PointerOutcome::Cancelled);
            assert_eq!(app.cursor(), 1);
        }

        #[test]
        fn test_release_outside_cancels() {
            let mut app = app(&["a", "b"]);

            app.pointer_down(0, true);
            app.pointer_drag(None);
            let outcome = app.pointer_up(None).unwrap();

            assert_eq!(outcome, PointerOutcome::Cancelled);
            assert_eq!(app.dragging(), None);
            assert_eq!(names(app.tiles()), vec!["a", "b"]);
        }

        #[test]
        fn test_drag_back_to_origin_is_a_self_drop() {
            let mut app = app(&["a", "b"]);

            app.pointer_down(0, true);
            app.pointer_drag(Some(1));
            app.pointer_drag(Some(0));
            let outcome = app.pointer_up(Some(0)).unwrap();

            assert_eq!(
                outcome,
                PointerOutcome::Dropped(DropOutcome::Swapped { from: 0, to: 0 })
            );
            assert_eq!(names(app.tiles()), vec!["a", "b"]);
        }

        #[test]
        fn test_release_without_press_is_noop() {
            let mut app = app(&["a", "b"]);
            assert_eq!(app.pointer_up(Some(1)).unwrap(), PointerOutcome::Cancelled);
        }
    }

    mod assembly_tests {
        use super::*;

        #[test]
        fn test_prepare_assembly_applies_ranks_and_locks() {
            let mut app = app(&["A", "B"]);
            app.pop_rank_char();
            app.push_rank_char('5');

            let (ticket, target) = app.prepare_assembly().unwrap();

            assert_eq!(names(ticket.order()), vec!["B", "A"]);
            assert_eq!(target.file_path(), PathBuf::from("/out/document.pdf"));
            assert!(app.is_locked());
            assert!(app.assembling);

            app.begin_drag(0);
            assert!(matches!(
                app.drop_on(1),
                Err(PdfStackError::SelectionLocked)
            ));
            assert!(matches!(
                app.prepare_assembly(),
                Err(PdfStackError::SelectionLocked)
            ));

            drop(ticket);
            assert!(!app.is_locked());
        }

        #[test]
        fn test_finish_assembly_records_output() {
            let mut app = app(&["A"]);
            app.assembling = true;

            app.finish_assembly(Ok(AssembledDocument {
                path: PathBuf::from("/out/document.pdf"),
                pages: Vec::new(),
            }));

            assert!(!app.assembling);
            assert_eq!(app.last_output, Some(PathBuf::from("/out/document.pdf")));
            assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Info);
        }

        #[test]
        fn test_finish_assembly_reports_failure() {
            let mut app = app(&[]);
            app.finish_assembly(Err(PdfStackError::EmptySelection));

            let status = app.status.clone().unwrap();
            assert_eq!(status.kind, StatusKind::Error);
            assert!(status.message.contains("No images selected"));
            assert!(app.last_output.is_none());
            assert_eq!(app.take_notice().as_deref(), Some("No images selected"));
            assert_eq!(app.take_notice(), None);
        }

        #[test]
        fn test_locked_selection_is_not_a_notice() {
            let mut app = app(&["A"]);
            app.report(&PdfStackError::SelectionLocked);

            assert!(app.status.is_some());
            assert_eq!(app.take_notice(), None);
        }

        #[test]
        fn test_blank_output_name_displays_default() {
            let mut app = app(&["A"]);
            app.set_output_name("   ").unwrap();
            assert_eq!(app.display_output_name(), "document");
            app.set_output_name(" trip ").unwrap();
            assert_eq!(app.display_output_name(), "trip");
        }

        #[test]
        fn test_output_name_cannot_leave_output_dir() {
            let mut app = app(&["A"]);
            app.set_output_name("album").unwrap();

            assert!(matches!(
                app.set_output_name("../etc/evil"),
                Err(PdfStackError::InvalidOutputName(_))
            ));
            assert!(app.set_output_name("..\\evil").is_err());

            let (_ticket, target) = app.prepare_assembly().unwrap();
            assert_eq!(target.name, "album");
            assert_eq!(target.file_path(), PathBuf::from("/out/album.pdf"));
        }
    }
}
