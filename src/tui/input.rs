use super::chrome::Modal;
use super::grid::GridLayout;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Represents the result of handling a key event on the tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Move the cursor one tile
    Left,
    Right,
    /// Move the cursor one grid row
    Up,
    Down,
    /// Pick up the cursor tile, or drop the held tile on it
    PickUp,
    /// Drop the held tile on the cursor tile
    Drop,
    /// Cancel a drag or close the topmost panel
    Cancel,
    /// Type into the cursor tile's rank field
    RankInput(char),
    RankBackspace,
    /// Resort pages by the rank fields
    ApplySort,
    /// Enlarge the cursor tile
    ViewImage,
    EditName,
    CreatePdf,
    OpenPdf,
    ToggleMenu,
    /// Toggle help overlay
    Help,
    Rescan,
    /// No action
    None,
}

/// Maps keyboard events to grid actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

        // Cursor: arrows or hjkl
        (KeyCode::Left, _) | (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Left,
        (KeyCode::Right, _) | (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::Right,
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Down,

        // Drag and drop
        (KeyCode::Char(' '), _) => KeyAction::PickUp,
        (KeyCode::Enter, _) => KeyAction::Drop,
        (KeyCode::Esc, _) => KeyAction::Cancel,

        // Rank field
        (KeyCode::Char(c), KeyModifiers::NONE) if c.is_ascii_digit() || c == '-' => {
            KeyAction::RankInput(c)
        }
        (KeyCode::Backspace, _) => KeyAction::RankBackspace,

        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::ApplySort,
        (KeyCode::Char('v'), KeyModifiers::NONE) => KeyAction::ViewImage,
        (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::EditName,
        (KeyCode::Char('p'), KeyModifiers::NONE) => KeyAction::CreatePdf,
        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::OpenPdf,
        (KeyCode::Char('m'), KeyModifiers::NONE) => KeyAction::ToggleMenu,
        (KeyCode::Char('R'), _) => KeyAction::Rescan,

        // Help: ?
        (KeyCode::Char('?'), _) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// What a key does while a modal is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    Close,
    Insert(char),
    Backspace,
    Submit,
    None,
}

/// Maps keyboard events for the open modal
pub fn handle_modal_key(modal: &Modal, key: KeyEvent) -> ModalAction {
    if key.code == KeyCode::Esc {
        return ModalAction::Close;
    }

    match modal {
        Modal::OutputName { .. } => match key.code {
            KeyCode::Enter => ModalAction::Submit,
            KeyCode::Backspace => ModalAction::Backspace,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                ModalAction::Insert(c)
            }
            _ => ModalAction::None,
        },
        // Any key dismisses the welcome dialog and notices
        Modal::Welcome | Modal::Notice { .. } => ModalAction::Close,
        Modal::Help => match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Enter => ModalAction::Close,
            _ => ModalAction::None,
        },
        Modal::Image { .. } => match key.code {
            KeyCode::Char('v') | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Char(' ') => {
                ModalAction::Close
            }
            _ => ModalAction::None,
        },
    }
}

/// Pointer gestures on the grid, already hit-tested against the last layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    /// Left button pressed at a cell
    Press {
        column: u16,
        row: u16,
        tile: Option<usize>,
        on_thumbnail: bool,
    },
    /// Moved with the left button held
    DragOver(Option<usize>),
    /// Left button released
    Release(Option<usize>),
    None,
}

/// Maps mouse events to grid gestures
pub fn handle_mouse_event(mouse: MouseEvent, grid: &GridLayout) -> MouseAction {
    let (column, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => MouseAction::Press {
            column,
            row,
            tile: grid.tile_at(column, row),
            on_thumbnail: grid.thumbnail_at(column, row).is_some(),
        },
        MouseEventKind::Drag(MouseButton::Left) => MouseAction::DragOver(grid.tile_at(column, row)),
        MouseEventKind::Up(MouseButton::Left) => MouseAction::Release(grid.tile_at(column, row)),
        _ => MouseAction::None,
    }
}
