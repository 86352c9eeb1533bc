// Half-block rendering of images for tiles and the enlarged view

use crate::decoder::decode_file;
use crate::error::DecodeError;
use image::{DynamicImage, GenericImageView, Pixel};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::path::Path;

/// Pixels rendered into a terminal rect of the given size, two pixels per row
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub lines: Vec<Line<'static>>,
    /// Dimensions of the source image
    pub source_width: u32,
    pub source_height: u32,
}

impl Thumbnail {
    /// Width in terminal cells
    pub fn columns(&self) -> usize {
        self.lines.first().map(|l| l.spans.len()).unwrap_or(0)
    }

    /// Height in terminal rows
    pub fn rows(&self) -> usize {
        self.lines.len()
    }
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;

    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        (original_width, original_height)
    } else {
        let new_width = ((original_width as f64 * ratio) as u32).max(1);
        let new_height = ((original_height as f64 * ratio) as u32).max(1);
        (new_width, new_height)
    }
}

/// Converts an image to styled lines using half-block characters.
///
/// The upper half block (▀) carries the upper pixel as foreground and the
/// lower pixel as background, so each cell shows two pixels.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let height = if height.is_multiple_of(2) {
        height
    } else {
        height + 1
    };

    // Triangle keeps large photos fast enough for interactive use
    let img = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let img = img.to_rgb8();

    (0..height / 2)
        .map(|row| {
            let upper_y = row * 2;
            let lower_y = upper_y + 1;

            let spans = (0..width)
                .map(|x| {
                    let upper = img.get_pixel(x, upper_y).to_rgb();
                    let lower = img.get_pixel(x, lower_y).to_rgb();
                    let style = Style::default()
                        .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                        .bg(Color::Rgb(lower[0], lower[1], lower[2]));
                    Span::styled("▀", style)
                })
                .collect::<Vec<_>>();

            Line::from(spans)
        })
        .collect()
}

/// Renders an in-memory image to fit `columns` x `rows` terminal cells
pub fn thumbnail_from_image(img: &DynamicImage, columns: u16, rows: u16) -> Thumbnail {
    let (source_width, source_height) = img.dimensions();
    // Terminal cells are roughly twice as tall as wide; one row holds two pixels
    let (width, height) = calculate_resize_dimensions(
        source_width,
        source_height,
        u32::from(columns),
        u32::from(rows) * 2,
    );

    Thumbnail {
        lines: image_to_halfblock_lines(img, width, height),
        source_width,
        source_height,
    }
}

/// Decodes the file at `path` and renders it to fit `columns` x `rows` cells
pub fn render_thumbnail(path: &Path, columns: u16, rows: u16) -> Result<Thumbnail, DecodeError> {
    let decoded = decode_file(path)?;
    Ok(thumbnail_from_image(&decoded.pixels, columns, rows))
}
