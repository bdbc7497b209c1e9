//! Tiles and the bordered tile grid.

use crate::elements::id;

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    /// Element id, an index into the element table.
    pub element: u8,
    /// Colour: background in the high nibble, foreground in the low nibble.
    pub color: u8,
}

impl Tile {
    /// The sentinel held by the border ring and returned for out-of-range reads.
    pub const EDGE: Tile = Tile::new(id::BOARD_EDGE, 0x00);

    /// Black empty floor.
    pub const EMPTY: Tile = Tile::new(id::EMPTY, 0x00);

    /// Create a tile.
    #[must_use]
    pub const fn new(element: u8, color: u8) -> Self {
        Self { element, color }
    }
}

/// A `width × height` playable area surrounded by a one-cell ring of edge tiles.
///
/// Storage is flat and row-major over `(width + 2) × (height + 2)` cells.
/// Coordinates are 1-based for playable cells; row and column 0 and
/// `width + 1`/`height + 1` form the ring. Only playable cells can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: i16,
    height: i16,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Create a grid with an empty playable area.
    #[must_use]
    pub fn new(width: i16, height: i16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pitch = width as usize + 2;
        let rows = height as usize + 2;
        let mut tiles = vec![Tile::EDGE; pitch * rows];
        for y in 1..=height as usize {
            for x in 1..=width as usize {
                tiles[y * pitch + x] = Tile::EMPTY;
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Playable width.
    #[must_use]
    pub const fn width(&self) -> i16 {
        self.width
    }

    /// Playable height.
    #[must_use]
    pub const fn height(&self) -> i16 {
        self.height
    }

    /// Number of playable cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `(x, y)` is a playable cell.
    #[must_use]
    #[inline]
    pub const fn is_playable(&self, x: i16, y: i16) -> bool {
        x >= 1 && y >= 1 && x <= self.width && y <= self.height
    }

    #[inline]
    fn index(&self, x: i16, y: i16) -> Option<usize> {
        if x >= 0 && y >= 0 && x <= self.width + 1 && y <= self.height + 1 {
            Some(y as usize * (self.width as usize + 2) + x as usize)
        } else {
            None
        }
    }

    /// Tile at `(x, y)`; the edge tile outside the grid.
    #[must_use]
    #[inline]
    pub fn get(&self, x: i16, y: i16) -> Tile {
        self.index(x, y).map_or(Tile::EDGE, |i| self.tiles[i])
    }

    /// Mutable access to a playable cell.
    #[inline]
    pub fn get_mut(&mut self, x: i16, y: i16) -> Option<&mut Tile> {
        if self.is_playable(x, y) {
            let i = self.index(x, y)?;
            self.tiles.get_mut(i)
        } else {
            None
        }
    }

    /// Overwrite a playable cell. Ring and out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i16, y: i16, tile: Tile) {
        if let Some(t) = self.get_mut(x, y) {
            *t = tile;
        }
    }

    /// Change only the element of a playable cell.
    #[inline]
    pub fn set_element(&mut self, x: i16, y: i16, element: u8) {
        if let Some(t) = self.get_mut(x, y) {
            t.element = element;
        }
    }

    /// Change only the colour of a playable cell.
    #[inline]
    pub fn set_color(&mut self, x: i16, y: i16, color: u8) {
        if let Some(t) = self.get_mut(x, y) {
            t.color = color;
        }
    }

    /// Playable cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16, Tile)> + '_ {
        (1..=self.height).flat_map(move |y| (1..=self.width).map(move |x| (x, y, self.get(x, y))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_has_edge_ring() {
        let grid = TileGrid::new(4, 3);
        assert_eq!(grid.get(0, 0), Tile::EDGE);
        assert_eq!(grid.get(5, 4), Tile::EDGE);
        assert_eq!(grid.get(1, 1), Tile::EMPTY);
        assert_eq!(grid.get(4, 3), Tile::EMPTY);
    }

    #[test]
    fn test_out_of_range_reads_edge() {
        let grid = TileGrid::new(4, 3);
        assert_eq!(grid.get(-1, 2), Tile::EDGE);
        assert_eq!(grid.get(2, 100), Tile::EDGE);
    }

    #[test]
    fn test_ring_writes_are_ignored() {
        let mut grid = TileGrid::new(4, 3);
        let wall = Tile::new(id::NORMAL, 0x0E);
        grid.set(0, 1, wall);
        grid.set(5, 1, wall);
        grid.set(-3, -3, wall);
        grid.set_element(2, 0, id::NORMAL);
        assert_eq!(grid.get(0, 1), Tile::EDGE);
        assert_eq!(grid.get(5, 1), Tile::EDGE);
        assert_eq!(grid.get(2, 0), Tile::EDGE);
    }

    #[test]
    fn test_set_parts() {
        let mut grid = TileGrid::new(4, 3);
        grid.set_element(2, 2, id::GEM);
        grid.set_color(2, 2, 0x0B);
        assert_eq!(grid.get(2, 2), Tile::new(id::GEM, 0x0B));
    }

    #[test]
    fn test_cells_are_row_major() {
        let grid = TileGrid::new(3, 2);
        let coords: Vec<_> = grid.cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (3, 2)]);
    }
}
