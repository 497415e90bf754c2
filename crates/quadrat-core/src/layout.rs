//! Grid layout: rows of instances mapped onto square cells.

use crate::instance::{GlyphInstance, InstanceId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An ordered sequence of glyph instances, appended left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub instances: Vec<GlyphInstance>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Append an instance to the end of the row.
    pub fn push(&mut self, instance: GlyphInstance) {
        self.instances.push(instance);
    }

    /// Remove an instance by id, returning it if present.
    pub fn remove(&mut self, id: InstanceId) -> Option<GlyphInstance> {
        let index = self.instances.iter().position(|i| i.id == id)?;
        Some(self.instances.remove(index))
    }
}

/// Grid spacing and the canonical quadrat it is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub quadrat: f64,
    pub cell_step: f64,
}

impl GridMetrics {
    /// Metrics for a scene: the cell step grows with the largest scale.
    pub fn for_rows(rows: &[Row], quadrat: f64) -> Self {
        Self {
            quadrat,
            cell_step: cell_step(rows, quadrat),
        }
    }

    /// Conversion ratio from glyph-intrinsic units to canvas units.
    pub fn offset_scale(&self) -> f64 {
        self.cell_step / self.quadrat
    }

    /// Rectangle covering the cell at `(row, col)`.
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        let origin = self.cell_origin(row, col);
        Rect::new(
            origin.x,
            origin.y,
            origin.x + self.cell_step,
            origin.y + self.cell_step,
        )
    }

    /// Top-left corner of the cell at `(row, col)`.
    pub fn cell_origin(&self, row: usize, col: usize) -> Point {
        Point::new(col as f64 * self.cell_step, row as f64 * self.cell_step)
    }

    /// Center of the cell at `(row, col)`.
    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        let half = self.cell_step / 2.0;
        self.cell_origin(row, col) + kurbo::Vec2::new(half, half)
    }
}

/// Cell step for a scene.
///
/// `quadrat × max(1, largest scale factor of any instance)`, so enlarged
/// instances never spill into a neighbouring cell.
pub fn cell_step(rows: &[Row], quadrat: f64) -> f64 {
    let largest = rows
        .iter()
        .flat_map(|row| row.instances.iter())
        .map(|instance| instance.transform.max_scale())
        .filter(|s| s.is_finite())
        .fold(1.0_f64, f64::max);
    quadrat * largest
}

/// An instance paired with its resolved grid placement for one frame.
#[derive(Debug, Clone, Copy)]
pub struct LayoutItem<'a> {
    pub instance: &'a GlyphInstance,
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
}

impl LayoutItem<'_> {
    /// Top-left corner of the item's cell.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Flatten rows into layout items in row-major, append order.
pub fn layout_rows(rows: &[Row], cell_step: f64) -> Vec<LayoutItem<'_>> {
    rows.iter()
        .enumerate()
        .flat_map(|(row_index, row)| {
            row.instances
                .iter()
                .enumerate()
                .map(move |(col, instance)| LayoutItem {
                    instance,
                    row: row_index,
                    col,
                    x: col as f64 * cell_step,
                    y: row_index as f64 * cell_step,
                })
        })
        .collect()
}

/// Overall canvas extent for a set of rows.
pub fn canvas_size(rows: &[Row], cell_step: f64) -> kurbo::Size {
    let cols = rows.iter().map(Row::len).max().unwrap_or(0);
    kurbo::Size::new(cols as f64 * cell_step, rows.len() as f64 * cell_step)
}
