// TUI module for rendering the terminal interface
pub mod chrome;
pub mod colors;
pub mod controller;
pub mod grid;
pub mod helpers;
pub mod input;

// Re-exports
pub use chrome::{Chrome, ChromeClick, Modal};
pub use colors::*;
pub use controller::{handle_key, handle_mouse, show_notices, Command};
pub use grid::{layout_grid, GridLayout};
pub use helpers::{format_file_size, truncate_name};

use crate::app::{App, StatusKind};
use crate::domain::FileHandle;
use crate::thumbnails::{SyncThumbnailManager, ThumbnailState};
use chrome::side_menu_area;
use grid::{scroll_to_cursor, Tile, THUMBNAIL_ROWS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

/// Presentation state kept between frames
#[derive(Debug, Default)]
pub struct Ui {
    pub chrome: Chrome,
    /// Tile positions from the last frame, used for mouse hit-testing
    pub grid: GridLayout,
    /// Full screen area of the last frame
    pub area: Rect,
    pub scroll_row: usize,
}

impl Ui {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Renders one frame
pub fn render(frame: &mut Frame, app: &App, ui: &mut Ui, thumbnails: &mut SyncThumbnailManager) {
    ui.area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header with progress
            Constraint::Min(0),    // Tile grid
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Footer
        ])
        .split(ui.area);

    render_header(frame, chunks[0], app);
    render_grid(frame, chunks[1], app, ui, thumbnails);
    render_status(frame, chunks[2], app);
    render_footer(frame, chunks[3]);

    if ui.chrome.is_menu_open() {
        render_side_menu(frame, app);
    }

    match ui.chrome.modal() {
        Some(Modal::Help) => render_help_overlay(frame),
        Some(Modal::Welcome) => render_welcome_overlay(frame),
        Some(Modal::Image { index }) => render_image_overlay(frame, app, *index, thumbnails),
        Some(Modal::OutputName { buffer }) => render_name_prompt(frame, buffer),
        Some(Modal::Notice { message }) => render_notice(frame, message),
        None => {}
    }
}

/// Rounded, cleared panel drawn above everything else; returns its inner area
fn overlay_block(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2)])
        .split(area);

    let title_line = Line::from(vec![
        Span::styled(
            " pdfstack ",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.summary(), Style::default().fg(TEXT_PRIMARY)),
    ]);

    let info_line = Line::from(vec![
        Span::styled(" → ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled(
            format!("{}.pdf", app.display_output_name()),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  in {}", app.output_dir.display()),
            Style::default().fg(TEXT_SECONDARY),
        ),
    ]);

    let header = Paragraph::new(vec![title_line, info_line])
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, chunks[0]);

    let progress = app.progress;
    let label = if app.assembling {
        format!("Creating PDF {}/{}", progress.completed, progress.total)
    } else if progress.is_complete() {
        format!("Done {}/{}", progress.completed, progress.total)
    } else {
        "Ready".to_string()
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress.fraction().clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, chunks[1]);
}

/// Creates the empty state widget for when nothing is selected
fn render_empty_state_widget() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "No Images Selected",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "The given paths contain no image files.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Add images and press R to rescan.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(" Pages "),
        )
        .alignment(Alignment::Center)
}

fn render_grid(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    ui: &mut Ui,
    thumbnails: &mut SyncThumbnailManager,
) {
    if app.tile_count() == 0 {
        ui.grid = GridLayout::default();
        frame.render_widget(render_empty_state_widget(), area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(" Pages ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Geometry first, so the scroll offset can follow the cursor
    let probe = layout_grid(inner, 0, 0);
    ui.scroll_row = scroll_to_cursor(app.cursor(), probe.columns, probe.visible_rows, ui.scroll_row);
    ui.grid = layout_grid(inner, app.tile_count(), ui.scroll_row);

    for tile in &ui.grid.tiles {
        if let Some(handle) = app.tiles().get(tile.index) {
            render_tile(frame, tile, handle, app, thumbnails);
        }
    }
}

fn tile_border_color(app: &App, index: usize) -> Color {
    if app.dragging() == Some(index) {
        ACCENT_PRIMARY
    } else if app.hover() == Some(index) {
        ACCENT_SECONDARY
    } else if app.cursor() == index {
        ACCENT_HIGHLIGHT
    } else {
        BORDER_COLOR
    }
}

fn render_tile(
    frame: &mut Frame,
    tile: &Tile,
    handle: &FileHandle,
    app: &App,
    thumbnails: &mut SyncThumbnailManager,
) {
    let color = tile_border_color(app, tile.index);
    let block = Block::default()
        .title(format!(" {} ", tile.index + 1))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    frame.render_widget(block, tile.area);

    if tile.thumbnail.width > 0 && tile.thumbnail.height > 0 {
        let preview = match thumbnails.request(&handle.path, tile.thumbnail.width, tile.thumbnail.height) {
            ThumbnailState::Ready(thumbnail) => Paragraph::new(thumbnail.lines.clone()),
            ThumbnailState::Loading => Paragraph::new(Span::styled(
                "loading…",
                Style::default().fg(TEXT_SECONDARY),
            )),
            ThumbnailState::Error(_) => Paragraph::new(Span::styled(
                "[!] unreadable",
                Style::default().fg(ACCENT_PRIMARY),
            )),
        };
        frame.render_widget(preview.alignment(Alignment::Center), tile.thumbnail);
    }

    let width = tile.area.width.saturating_sub(2);
    let bottom = tile.area.y + tile.area.height.saturating_sub(1);

    let name_row = tile.area.y + 1 + THUMBNAIL_ROWS;
    if name_row < bottom {
        let name = Paragraph::new(Span::styled(
            truncate_name(&handle.name, usize::from(width)),
            Style::default().fg(TEXT_PRIMARY),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(name, Rect::new(tile.area.x + 1, name_row, width, 1));
    }

    let rank_row = name_row + 1;
    if rank_row < bottom {
        let focused = app.cursor() == tile.index;
        let field_style = if focused {
            Style::default()
                .fg(BG_DARK)
                .bg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_PRIMARY)
        };
        let rank = Paragraph::new(Line::from(vec![
            Span::styled("rank ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled(format!("[{:>3}]", app.rank(tile.index)), field_style),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(rank, Rect::new(tile.area.x + 1, rank_row, width, 1));
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => ACCENT_SECONDARY,
                StatusKind::Error => ACCENT_PRIMARY,
            };
            Line::from(Span::styled(
                format!(" {}", status.message),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            " Drag tiles to reorder, or type ranks and press s",
            Style::default().fg(TEXT_SECONDARY),
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let separator = || Span::raw("  │  ");
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
    };
    let label = |l: &'static str| Span::styled(l, Style::default().fg(TEXT_SECONDARY));

    let controls = Line::from(vec![
        key(" Space "),
        label("Move"),
        separator(),
        key("0-9 "),
        label("Rank"),
        separator(),
        key("s "),
        label("Sort"),
        separator(),
        key("p "),
        label("Create PDF"),
        separator(),
        key("m "),
        label("Menu"),
        separator(),
        key("? "),
        label("Help"),
        separator(),
        key("q "),
        label("Quit"),
    ]);

    let footer = Paragraph::new(controls)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

/// Renders the side menu with the current page order
pub fn render_side_menu(frame: &mut Frame, app: &App) {
    let area = side_menu_area(frame.area());
    let inner = overlay_block(frame, area, "Page order");

    let width = usize::from(inner.width.saturating_sub(6));
    let mut lines: Vec<Line> = app
        .tiles()
        .iter()
        .enumerate()
        .map(|(i, handle)| {
            let style = if i == app.cursor() {
                Style::default()
                    .fg(ACCENT_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_PRIMARY)
            };
            Line::from(vec![
                Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(TEXT_SECONDARY)),
                Span::styled(truncate_name(&handle.name, width), style),
            ])
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (empty)",
            Style::default().fg(TEXT_SECONDARY),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  n ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw("Rename output"),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  p ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw("Create PDF"),
    ]));
    if app.last_output.is_some() {
        lines.push(Line::from(vec![
            Span::styled("  o ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::raw("Open last PDF"),
        ]));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

fn shortcut(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw(description),
    ])
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let area = Modal::Help.area(frame.area());
    let inner = overlay_block(frame, area, "Help");

    let help_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        shortcut("←→↑↓ hjkl", "Move cursor"),
        shortcut("Space", "Pick up / drop page"),
        shortcut("Enter", "Drop held page"),
        shortcut("Esc", "Cancel drag, close menu"),
        Line::from(""),
        shortcut("0-9 -", "Edit rank field"),
        shortcut("s", "Sort pages by rank"),
        shortcut("v", "View image"),
        Line::from(""),
        shortcut("n", "Rename output"),
        shortcut("p", "Create PDF"),
        shortcut("o", "Open created PDF"),
        shortcut("m", "Toggle page menu"),
        shortcut("R", "Rescan paths"),
        shortcut("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Mouse: drag a tile onto another to swap, click a thumbnail to enlarge",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = Modal::Welcome.area(frame.area());
    let inner = overlay_block(frame, area, "Welcome to pdfstack");

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let step = |n: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(n, Style::default().fg(TEXT_SECONDARY)),
            Span::raw(text),
        ])
    };

    let welcome_lines = vec![
        Line::from(""),
        heading("Welcome to pdfstack!"),
        Line::from(""),
        Line::from("pdfstack turns a stack of images into a single PDF, one image per A4 page."),
        Line::from(""),
        heading("Quick Start:"),
        Line::from(""),
        step("  1. ", "Arrange the pages: drag tiles onto each other to swap them"),
        step("  2. ", "Or type a rank under each tile and press s to sort by it"),
        step("  3. ", "Press n to name the file, then p to create the PDF"),
        Line::from(""),
        heading("Good to know:"),
        Line::from(""),
        step("  •  ", "Pages with equal ranks keep their current order"),
        step("  •  ", "The order is locked while a PDF is being created"),
        step("  •  ", "Press m for the page list and ? for all shortcuts"),
        Line::from(""),
        Line::from(""),
        heading("Press any key to start..."),
    ];

    let paragraph = Paragraph::new(welcome_lines)
        .style(Style::default().fg(TEXT_PRIMARY))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, inner);
}

/// Renders the enlarged view of one page
pub fn render_image_overlay(
    frame: &mut Frame,
    app: &App,
    index: usize,
    thumbnails: &mut SyncThumbnailManager,
) {
    let Some(handle) = app.tiles().get(index) else {
        return;
    };

    let area = Modal::Image { index }.area(frame.area());
    let inner = overlay_block(frame, area, &format!("Page {} · {}", index + 1, handle.name));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let image_area = chunks[0];
    let mut info = vec![Span::styled(
        format_file_size(handle.size),
        Style::default().fg(TEXT_SECONDARY),
    )];

    if image_area.width > 0 && image_area.height > 0 {
        match thumbnails.request(&handle.path, image_area.width, image_area.height) {
            ThumbnailState::Ready(thumbnail) => {
                info.insert(
                    0,
                    Span::styled(
                        format!("{}×{} px  ", thumbnail.source_width, thumbnail.source_height),
                        Style::default().fg(TEXT_SECONDARY),
                    ),
                );
                let preview =
                    Paragraph::new(thumbnail.lines.clone()).alignment(Alignment::Center);
                frame.render_widget(preview, image_area);
            }
            ThumbnailState::Loading => {
                let loading = Paragraph::new(Span::styled(
                    "Loading preview…",
                    Style::default().fg(TEXT_SECONDARY),
                ))
                .alignment(Alignment::Center);
                frame.render_widget(loading, image_area);
            }
            ThumbnailState::Error(e) => {
                let error = Paragraph::new(vec![
                    Line::from(Span::styled(
                        "[!] Error generating preview",
                        Style::default()
                            .fg(ACCENT_PRIMARY)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(e),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false });
                frame.render_widget(error, image_area);
            }
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(info)).alignment(Alignment::Center),
        chunks[1],
    );
}

/// Renders the output name prompt
pub fn render_name_prompt(frame: &mut Frame, buffer: &str) {
    let area = Modal::OutputName {
        buffer: String::new(),
    }
    .area(frame.area());
    let inner = overlay_block(frame, area, "Output name");

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!(" {}", buffer),
                Style::default()
                    .fg(TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("▏", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled(".pdf", Style::default().fg(TEXT_SECONDARY)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to save • Esc to cancel",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Renders a failure the user has to acknowledge
pub fn render_notice(frame: &mut Frame, message: &str) {
    let area = Modal::Notice {
        message: String::new(),
    }
    .area(frame.area());
    let inner = overlay_block(frame, area, "[!] Cannot create PDF");

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}
