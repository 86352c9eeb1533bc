// Tile grid geometry: where each page tile lands and which tile is under the pointer

use ratatui::layout::Rect;

/// Outer size of one tile, borders included
pub const TILE_WIDTH: u16 = 20;
pub const TILE_HEIGHT: u16 = 9;
/// Rows reserved for the thumbnail inside a tile
pub const THUMBNAIL_ROWS: u16 = 5;
const GAP: u16 = 1;

/// One tile drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub area: Rect,
    pub thumbnail: Rect,
}

/// Positions of the visible tiles, recomputed on every render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub visible_rows: usize,
    pub tiles: Vec<Tile>,
}

pub(crate) fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

impl GridLayout {
    /// Index of the tile under a terminal cell
    pub fn tile_at(&self, column: u16, row: u16) -> Option<usize> {
        self.tiles
            .iter()
            .find(|tile| contains(tile.area, column, row))
            .map(|tile| tile.index)
    }

    /// Index of the tile whose thumbnail is under a terminal cell
    pub fn thumbnail_at(&self, column: u16, row: u16) -> Option<usize> {
        self.tiles
            .iter()
            .find(|tile| contains(tile.thumbnail, column, row))
            .map(|tile| tile.index)
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.index == index)
    }
}

/// Lays out `count` tiles in `area`, starting at grid row `scroll_row`
pub fn layout_grid(area: Rect, count: usize, scroll_row: usize) -> GridLayout {
    let columns = usize::from((area.width + GAP) / (TILE_WIDTH + GAP)).max(1);
    let visible_rows = usize::from(area.height / TILE_HEIGHT).max(1);
    let tile_width = TILE_WIDTH.min(area.width);
    let tile_height = TILE_HEIGHT.min(area.height);

    let first = scroll_row * columns;
    let last = count.min(first + visible_rows * columns);

    let tiles = (first..last)
        .map(|index| {
            let row = (index / columns - scroll_row) as u16;
            let col = (index % columns) as u16;
            let area = Rect {
                x: area.x + col * (TILE_WIDTH + GAP),
                y: area.y + row * TILE_HEIGHT,
                width: tile_width,
                height: tile_height,
            };
            let thumbnail = Rect {
                x: area.x + 1,
                y: area.y + 1,
                width: area.width.saturating_sub(2),
                height: THUMBNAIL_ROWS.min(area.height.saturating_sub(2)),
            };
            Tile {
                index,
                area,
                thumbnail,
            }
        })
        .collect();

    GridLayout {
        columns,
        visible_rows,
        tiles,
    }
}

/// Smallest scroll change that keeps the cursor row on screen
pub fn scroll_to_cursor(cursor: usize, columns: usize, visible_rows: usize, scroll_row: usize) -> usize {
    let columns = columns.max(1);
    let visible_rows = visible_rows.max(1);
    let cursor_row = cursor / columns;

    if cursor_row < scroll_row {
        cursor_row
    } else if cursor_row >= scroll_row + visible_rows {
        cursor_row + 1 - visible_rows
    } else {
        scroll_row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(width: u16, height: u16) -> Rect {
        Rect::new(2, 3, width, height)
    }

    #[test]
    fn test_columns_fill_width() {
        // 3 tiles of 20 plus 2 gaps
        let grid = layout_grid(area(62, 18), 10, 0);
        assert_eq!(grid.columns, 3);
        assert_eq!(grid.visible_rows, 2);
        assert_eq!(grid.tiles.len(), 6);
    }

    #[test]
    fn test_narrow_area_still_has_one_column() {
        let grid = layout_grid(area(10, 4), 3, 0);
        assert_eq!(grid.columns, 1);
        assert_eq!(grid.tiles[0].area.width, 10);
    }

    #[test]
    fn test_tile_positions_follow_index() {
        let grid = layout_grid(area(62, 18), 5, 0);

        assert_eq!(grid.tiles[0].area, Rect::new(2, 3, 20, 9));
        assert_eq!(grid.tiles[1].area, Rect::new(23, 3, 20, 9));
        assert_eq!(grid.tiles[3].area, Rect::new(2, 12, 20, 9));
        assert_eq!(grid.tiles[0].thumbnail, Rect::new(3, 4, 18, 5));
    }

    #[test]
    fn test_hit_testing() {
        let grid = layout_grid(area(62, 18), 5, 0);

        assert_eq!(grid.tile_at(2, 3), Some(0));
        assert_eq!(grid.tile_at(24, 10), Some(1));
        assert_eq!(grid.tile_at(22, 5), None); // gap
        assert_eq!(grid.tile_at(45, 15), None); // no tile 5
        assert_eq!(grid.thumbnail_at(3, 4), Some(0));
        assert_eq!(grid.thumbnail_at(3, 10), None); // name row
    }

    #[test]
    fn test_scrolled_layout_starts_at_row() {
        let grid = layout_grid(area(62, 9), 7, 1);

        assert_eq!(grid.tiles.len(), 3);
        assert_eq!(grid.tiles[0].index, 3);
        assert_eq!(grid.tiles[0].area.y, 3);
        assert!(grid.tile(0).is_none());
    }

    #[test]
    fn test_scroll_to_cursor() {
        assert_eq!(scroll_to_cursor(0, 3, 2, 0), 0);
        assert_eq!(scroll_to_cursor(7, 3, 2, 0), 1);
        assert_eq!(scroll_to_cursor(1, 3, 2, 2), 0);
        assert_eq!(scroll_to_cursor(4, 3, 2, 1), 1);
    }
}
