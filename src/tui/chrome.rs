// Side menu and modal dialogs layered over the tile grid

use super::grid::contains;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the side menu panel in columns
pub const SIDE_MENU_WIDTH: u16 = 34;

/// Dialogs that take over input while open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Help,
    Welcome,
    /// Enlarged view of the tile at `index`
    Image { index: usize },
    /// Output name prompt with its edit buffer
    OutputName { buffer: String },
    /// Failure the user has to acknowledge
    Notice { message: String },
}

impl Modal {
    /// Percentage of the screen the dialog covers
    fn size(&self) -> (u16, u16) {
        match self {
            Modal::Help => (50, 70),
            Modal::Welcome => (85, 85),
            Modal::Image { .. } => (90, 90),
            Modal::OutputName { .. } => (50, 20),
            Modal::Notice { .. } => (50, 25),
        }
    }

    /// Screen rect of the dialog within `area`
    pub fn area(&self, area: Rect) -> Rect {
        let (x, y) = self.size();
        centered_rect(x, y, area)
    }
}

/// Screen rect of the side menu within `area`
pub fn side_menu_area(area: Rect) -> Rect {
    Rect {
        width: SIDE_MENU_WIDTH.min(area.width),
        ..area
    }
}

/// Helper to create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Result of a click routed through the chrome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromeClick {
    /// Nothing open; the click belongs to the grid
    PassThrough,
    /// Landed inside an open panel
    Inside,
    /// Closed the side menu
    MenuClosed,
    /// Closed a modal
    ModalClosed(Modal),
}

/// Open/closed state of the side menu and the active modal.
///
/// At most one modal is open; it sits above the side menu, so escape and
/// clicks reach the modal first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    menu_open: bool,
    modal: Option<Modal>,
}

impl Chrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Option<&mut Modal> {
        self.modal.as_mut()
    }

    /// Opens `modal`, replacing any open one
    pub fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
    }

    pub fn close_modal(&mut self) -> Option<Modal> {
        self.modal.take()
    }

    /// Escape closes the topmost open layer; `None` if nothing was open
    pub fn escape(&mut self) -> Option<ChromeClick> {
        if let Some(modal) = self.close_modal() {
            return Some(ChromeClick::ModalClosed(modal));
        }
        if self.menu_open {
            self.menu_open = false;
            return Some(ChromeClick::MenuClosed);
        }
        None
    }

    /// Routes a click at a terminal cell, given the full screen `area`
    pub fn click(&mut self, column: u16, row: u16, area: Rect) -> ChromeClick {
        if let Some(modal) = &self.modal {
            let inside = contains(modal.area(area), column, row);
            // The enlarged image closes on any click
            if matches!(modal, Modal::Image { .. }) || !inside {
                return self
                    .close_modal()
                    .map(ChromeClick::ModalClosed)
                    .unwrap_or(ChromeClick::PassThrough);
            }
            return ChromeClick::Inside;
        }

        if self.menu_open {
            if contains(side_menu_area(area), column, row) {
                return ChromeClick::Inside;
            }
            self.menu_open = false;
            return ChromeClick::MenuClosed;
        }

        ChromeClick::PassThrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 40,
    };

    mod menu_tests {
        use super::*;

        #[test]
        fn test_toggle_menu() {
            let mut chrome = Chrome::new();
            assert!(!chrome.is_menu_open());

            chrome.toggle_menu();
            assert!(chrome.is_menu_open());

            chrome.toggle_menu();
            assert!(!chrome.is_menu_open());
        }

        #[test]
        fn test_backdrop_click_closes_menu() {
            let mut chrome = Chrome::new();
            chrome.toggle_menu();

            assert_eq!(chrome.click(5, 5, SCREEN), ChromeClick::Inside);
            assert!(chrome.is_menu_open());

            assert_eq!(chrome.click(80, 5, SCREEN), ChromeClick::MenuClosed);
            assert!(!chrome.is_menu_open());
        }

        #[test]
        fn test_escape_closes_menu() {
            let mut chrome = Chrome::new();
            chrome.toggle_menu();

            assert_eq!(chrome.escape(), Some(ChromeClick::MenuClosed));
            assert_eq!(chrome.escape(), None);
        }
    }

    mod modal_tests {
        use super::*;

        #[test]
        fn test_open_and_close_modal() {
            let mut chrome = Chrome::new();
            chrome.open_modal(Modal::Help);

            assert_eq!(chrome.modal(), Some(&Modal::Help));
            assert_eq!(chrome.close_modal(), Some(Modal::Help));
            assert_eq!(chrome.modal(), None);
        }

        #[test]
        fn test_escape_closes_modal_before_menu() {
            let mut chrome = Chrome::new();
            chrome.toggle_menu();
            chrome.open_modal(Modal::Welcome);

            assert_eq!(
                chrome.escape(),
                Some(ChromeClick::ModalClosed(Modal::Welcome))
            );
            assert!(chrome.is_menu_open());
        }

        #[test]
        fn test_backdrop_click_closes_modal() {
            let mut chrome = Chrome::new();
            chrome.open_modal(Modal::Help);

            assert_eq!(chrome.click(50, 20, SCREEN), ChromeClick::Inside);
            assert_eq!(
                chrome.click(0, 0, SCREEN),
                ChromeClick::ModalClosed(Modal::Help)
            );
            assert_eq!(chrome.click(0, 0, SCREEN), ChromeClick::PassThrough);
        }

        #[test]
        fn test_image_modal_closes_on_any_click() {
            let mut chrome = Chrome::new();
            chrome.open_modal(Modal::Image { index: 2 });

            assert_eq!(
                chrome.click(50, 20, SCREEN),
                ChromeClick::ModalClosed(Modal::Image { index: 2 })
            );
        }

        #[test]
        fn test_modal_edit_buffer() {
            let mut chrome = Chrome::new();
            chrome.open_modal(Modal::OutputName {
                buffer: "doc".to_string(),
            });

            if let Some(Modal::OutputName { buffer }) = chrome.modal_mut() {
                buffer.push('s');
            }

            assert_eq!(
                chrome.close_modal(),
                Some(Modal::OutputName {
                    buffer: "docs".to_string()
                })
            );
        }

        #[test]
        fn test_modal_area_is_centered() {
            let rect = Modal::Help.area(SCREEN);
            assert!(rect.x > 0 && rect.y > 0);
            assert!(rect.x + rect.width < SCREEN.width);
            assert_eq!(side_menu_area(SCREEN).width, SIDE_MENU_WIDTH);
        }
    }
}
