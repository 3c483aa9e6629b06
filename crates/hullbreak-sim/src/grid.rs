//! Uniform-cell spatial index over block world positions.

use std::collections::{BTreeSet, HashMap};

use glam::DVec2;

use hullbreak_core::constants::RAY_MAX_STEPS;
use hullbreak_core::types::Rect;

use crate::block_index::BlockHandle;

type Cell = (i32, i32);

/// Maps world cells to the blocks whose centers fall inside them.
///
/// Queries return every block in any cell the query touches, so callers may
/// see blocks slightly outside the requested area but never miss one inside.
#[derive(Debug, Clone)]
pub struct Grid {
    cell_size: f64,
    cells: HashMap<Cell, BTreeSet<BlockHandle>>,
    block_cells: HashMap<BlockHandle, Cell>,
}

impl Grid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            block_cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_of(&self, p: DVec2) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a block, or move it if it is already indexed.
    pub fn insert(&mut self, handle: BlockHandle, position: DVec2) {
        let cell = self.cell_of(position);
        match self.block_cells.insert(handle, cell) {
            Some(old) if old == cell => return,
            Some(old) => self.detach(handle, old),
            None => {}
        }
        self.cells.entry(cell).or_default().insert(handle);
    }

    /// Move a block to its new position. Only touches buckets when the cell changes.
    pub fn update(&mut self, handle: BlockHandle, position: DVec2) {
        self.insert(handle, position);
    }

    pub fn remove(&mut self, handle: BlockHandle) -> bool {
        match self.block_cells.remove(&handle) {
            Some(cell) => {
                self.detach(handle, cell);
                true
            }
            None => false,
        }
    }

    fn detach(&mut self, handle: BlockHandle, cell: Cell) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.remove(&handle);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    pub fn contains(&self, handle: BlockHandle) -> bool {
        self.block_cells.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.block_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_cells.is_empty()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.block_cells.clear();
    }

    fn collect_cells(&self, min: Cell, max: Cell, out: &mut Vec<BlockHandle>) {
        // Walk whichever side is smaller: the cell range or the occupied cells.
        let span = (max.0 - min.0 + 1) as i64 * (max.1 - min.1 + 1) as i64;
        if span > self.cells.len() as i64 {
            let mut hits: Vec<(&Cell, &BTreeSet<BlockHandle>)> = self
                .cells
                .iter()
                .filter(|(c, _)| c.0 >= min.0 && c.0 <= max.0 && c.1 >= min.1 && c.1 <= max.1)
                .collect();
            hits.sort_unstable_by_key(|(c, _)| **c);
            for (_, bucket) in hits {
                out.extend(bucket.iter().copied());
            }
            return;
        }
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    out.extend(bucket.iter().copied());
                }
            }
        }
    }

    /// Blocks in every cell overlapping the rectangle. An empty region yields
    /// an empty list.
    pub fn blocks_in_area(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<BlockHandle> {
        let rect = Rect::new(min_x, min_y, max_x, max_y);
        self.blocks_in_rect(&rect)
    }

    pub fn blocks_in_rect(&self, rect: &Rect) -> Vec<BlockHandle> {
        let mut out = Vec::new();
        self.collect_cells(self.cell_of(rect.min), self.cell_of(rect.max), &mut out);
        out
    }

    /// Blocks in the 3x3 cells around `position`.
    pub fn blocks_near(&self, position: DVec2) -> Vec<BlockHandle> {
        let (cx, cy) = self.cell_of(position);
        let mut out = Vec::new();
        self.collect_cells((cx - 1, cy - 1), (cx + 1, cy + 1), &mut out);
        out
    }

    /// Blocks in every cell crossed by the segment from `start` to `end`,
    /// nearest cells first.
    pub fn blocks_along_ray(&self, start: DVec2, end: DVec2) -> Vec<BlockHandle> {
        let mut out = Vec::new();
        let d = end - start;
        let (mut x, mut y) = self.cell_of(start);
        let (end_x, end_y) = self.cell_of(end);
        let step_x = if d.x > 0.0 { 1 } else { -1 };
        let step_y = if d.y > 0.0 { 1 } else { -1 };
        // Ray parameter per cell step, and to the first boundary, on each axis.
        let axis = |delta: f64, offset: f64| -> (f64, f64) {
            if delta == 0.0 {
                (f64::INFINITY, f64::INFINITY)
            } else {
                ((self.cell_size / delta).abs(), (offset / delta).abs())
            }
        };
        let x_offset = if d.x > 0.0 {
            (x + 1) as f64 * self.cell_size - start.x
        } else {
            start.x - x as f64 * self.cell_size
        };
        let y_offset = if d.y > 0.0 {
            (y + 1) as f64 * self.cell_size - start.y
        } else {
            start.y - y as f64 * self.cell_size
        };
        let (t_delta_x, mut t_max_x) = axis(d.x, x_offset);
        let (t_delta_y, mut t_max_y) = axis(d.y, y_offset);

        for _ in 0..RAY_MAX_STEPS {
            if let Some(bucket) = self.cells.get(&(x, y)) {
                out.extend(bucket.iter().copied());
            }
            if x == end_x && y == end_y {
                break;
            }
            if t_max_x < t_max_y {
                t_max_x += t_delta_x;
                x += step_x;
            } else {
                t_max_y += t_delta_y;
                y += step_y;
            }
        }
        out
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(hullbreak_core::constants::GRID_CELL_SIZE)
    }
}
