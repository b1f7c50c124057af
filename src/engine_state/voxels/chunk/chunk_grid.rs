//! # Chunk Grid
//!
//! Dense storage for the cells of one chunk. Cells are laid out x-major:
//! the flat index of `(x, y, z)` is `(x * height + y) * width + z`, which is
//! also the order cells are written to save files.

use cgmath::Point3;

use crate::engine_state::voxels::block::BlockCell;

/// A dense `width x height x width` array of block cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkGrid {
    width: usize,
    height: usize,
    cells: Vec<BlockCell>,
}

impl ChunkGrid {
    /// Creates an all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        ChunkGrid {
            width,
            height,
            cells: vec![BlockCell::EMPTY; width * height * width],
        }
    }

    /// Wraps existing cells, returning `None` when the cell count does not match the dimensions.
    pub fn from_cells(width: usize, height: usize, cells: Vec<BlockCell>) -> Option<Self> {
        if cells.len() != width * height * width {
            return None;
        }

        Some(ChunkGrid {
            width,
            height,
            cells,
        })
    }

    /// Clears every cell to empty, resizing for new dimensions and reusing the allocation.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height * width, BlockCell::EMPTY);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All cells in storage order.
    pub fn cells(&self) -> &[BlockCell] {
        &self.cells
    }

    fn index_of(&self, pos: Point3<i32>) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.z < 0 {
            return None;
        }

        let (x, y, z) = (pos.x as usize, pos.y as usize, pos.z as usize);
        if x >= self.width || y >= self.height || z >= self.width {
            return None;
        }

        Some((x * self.height + y) * self.width + z)
    }

    /// The cell at a local position, or `None` when out of bounds.
    pub fn get(&self, pos: Point3<i32>) -> Option<&BlockCell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// Mutable access to the cell at a local position, or `None` when out of bounds.
    pub fn get_mut(&mut self, pos: Point3<i32>) -> Option<&mut BlockCell> {
        self.index_of(pos).map(move |i| &mut self.cells[i])
    }

    /// Solidity test used by face culling: out-of-bounds positions count as empty.
    #[inline]
    pub fn is_solid(&self, pos: Point3<i32>) -> bool {
        self.get(pos).is_some_and(|cell| cell.is_solid())
    }

    /// Iterates every cell with its local position, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, &BlockCell)> + '_ {
        let (width, height) = (self.width, self.height);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let z = i % width;
            let y = (i / width) % height;
            let x = i / (width * height);
            (Point3::new(x as i32, y as i32, z as i32), cell)
        })
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_solid()).count()
    }
}
