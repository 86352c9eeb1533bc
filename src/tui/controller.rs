// Routes terminal events to the session state and the chrome

use super::chrome::{ChromeClick, Modal};
use super::input::{
    handle_key_event, handle_modal_key, handle_mouse_event, KeyAction, ModalAction, MouseAction,
};
use super::Ui;
use crate::app::{App, PointerOutcome};
use crossterm::event::{KeyEvent, MouseEvent};

/// Follow-up work that needs resources outside the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,
    CreatePdf,
    OpenPdf,
    Rescan,
    /// The welcome dialog was closed and should not be shown again
    WelcomeDismissed,
}

fn closed(modal: Option<Modal>) -> Command {
    match modal {
        Some(Modal::Welcome) => Command::WelcomeDismissed,
        _ => Command::None,
    }
}

fn handle_modal(app: &mut App, ui: &mut Ui, key: KeyEvent) -> Command {
    let Some(modal) = ui.chrome.modal() else {
        return Command::None;
    };

    match handle_modal_key(modal, key) {
        ModalAction::Close => closed(ui.chrome.close_modal()),
        ModalAction::Insert(c) => {
            if let Some(Modal::OutputName { buffer }) = ui.chrome.modal_mut() {
                buffer.push(c);
            }
            Command::None
        }
        ModalAction::Backspace => {
            if let Some(Modal::OutputName { buffer }) = ui.chrome.modal_mut() {
                buffer.pop();
            }
            Command::None
        }
        ModalAction::Submit => {
            if let Some(Modal::OutputName { buffer }) = ui.chrome.close_modal() {
                match app.set_output_name(&buffer) {
                    Ok(()) => app.set_info(format!(
                        "Output name set to {}.pdf",
                        app.display_output_name()
                    )),
                    Err(e) => app.report(&e),
                }
            }
            Command::None
        }
        ModalAction::None => Command::None,
    }
}

/// Opens a dialog for a failure the user has to acknowledge
pub fn show_notices(app: &mut App, ui: &mut Ui) {
    if let Some(message) = app.take_notice() {
        ui.chrome.open_modal(Modal::Notice { message });
    }
}

/// Handles one key press
pub fn handle_key(app: &mut App, ui: &mut Ui, key: KeyEvent) -> Command {
    if ui.chrome.modal().is_some() {
        return handle_modal(app, ui, key);
    }

    let columns = ui.grid.columns.max(1) as isize;

    match handle_key_event(key) {
        KeyAction::Quit => return Command::Quit,
        KeyAction::Left => app.move_cursor(-1),
        KeyAction::Right => app.move_cursor(1),
        KeyAction::Up => app.move_cursor(-columns),
        KeyAction::Down => app.move_cursor(columns),
        KeyAction::PickUp => {
            if let Err(e) = app.toggle_pick_up() {
                app.report(&e);
            }
        }
        KeyAction::Drop => {
            if app.dragging().is_some() {
                if let Err(e) = app.drop_on(app.cursor()) {
                    app.report(&e);
                }
            }
        }
        KeyAction::Cancel => {
            if app.dragging().is_some() {
                app.cancel_drag();
                app.set_info("Drag cancelled");
            } else {
                ui.chrome.escape();
            }
        }
        KeyAction::RankInput(c) => app.push_rank_char(c),
        KeyAction::RankBackspace => app.pop_rank_char(),
        KeyAction::ApplySort => {
            if let Err(e) = app.apply_manual_sort() {
                app.report(&e);
            }
        }
        KeyAction::ViewImage => {
            if app.tile_count() > 0 {
                ui.chrome.open_modal(Modal::Image {
                    index: app.cursor(),
                });
            }
        }
        KeyAction::EditName => ui.chrome.open_modal(Modal::OutputName {
            buffer: app.output_name.clone(),
        }),
        KeyAction::CreatePdf => return Command::CreatePdf,
        KeyAction::OpenPdf => return Command::OpenPdf,
        KeyAction::ToggleMenu => ui.chrome.toggle_menu(),
        KeyAction::Help => ui.chrome.open_modal(Modal::Help),
        KeyAction::Rescan => return Command::Rescan,
        KeyAction::None => {}
    }

    Command::None
}

/// Handles one mouse event against the last rendered layout
pub fn handle_mouse(app: &mut App, ui: &mut Ui, mouse: MouseEvent) -> Command {
    match handle_mouse_event(mouse, &ui.grid) {
        MouseAction::Press {
            column,
            row,
            tile,
            on_thumbnail,
        } => match ui.chrome.click(column, row, ui.area) {
            ChromeClick::PassThrough => {
                if let Some(index) = tile {
                    app.pointer_down(index, on_thumbnail);
                }
            }
            ChromeClick::ModalClosed(modal) => return closed(Some(modal)),
            ChromeClick::Inside | ChromeClick::MenuClosed => {}
        },
        MouseAction::DragOver(tile) => {
            if ui.chrome.modal().is_none() {
                app.pointer_drag(tile);
            }
        }
        MouseAction::Release(tile) => match app.pointer_up(tile) {
            Ok(PointerOutcome::Clicked(index)) => ui.chrome.open_modal(Modal::Image { index }),
            Ok(_) => {}
            Err(e) => app.report(&e),
        },
        MouseAction::None => {}
    }

    Command::None
}
