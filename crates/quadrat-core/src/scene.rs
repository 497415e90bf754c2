//! Scene document: rows of glyph instances with undo history.

use crate::glyph::GlyphDefinition;
use crate::instance::{GlyphInstance, InstanceId};
use crate::layout::{self, GridMetrics, LayoutItem, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Where an instance sits in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
}

/// A scene: ordered rows of instances plus glyphs imported into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDocument {
    pub id: String,
    pub name: String,
    pub rows: Vec<Row>,
    /// Row that receives inserted and pasted instances.
    #[serde(default)]
    pub active_row: usize,
    /// Glyph definitions created from foreign SVG, kept with the scene.
    #[serde(default)]
    pub imported_glyphs: Vec<GlyphDefinition>,
    #[serde(skip)]
    undo_stack: Vec<Vec<Row>>,
    #[serde(skip)]
    redo_stack: Vec<Vec<Row>>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDocument {
    /// Create a scene with one empty row.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            rows: vec![Row::new()],
            active_row: 0,
            imported_glyphs: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Push current rows to the undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        self.undo_stack.push(self.rows.clone());
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(rows) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.rows, rows);
        self.redo_stack.push(current);
        self.clamp_active_row();
        true
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(rows) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.rows, rows);
        self.undo_stack.push(current);
        self.clamp_active_row();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clamp_active_row(&mut self) {
        if self.rows.is_empty() {
            self.rows.push(Row::new());
        }
        self.active_row = self.active_row.min(self.rows.len() - 1);
    }

    /// Append an empty row and make it active. Returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(Row::new());
        self.active_row = self.rows.len() - 1;
        self.active_row
    }

    /// Remove a row and destroy its instances.
    ///
    /// The scene always keeps at least one row.
    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        if index >= self.rows.len() {
            return None;
        }
        let removed = self.rows.remove(index);
        if self.active_row > index {
            self.active_row -= 1;
        }
        self.clamp_active_row();
        Some(removed)
    }

    /// Make `index` the active row, if it exists.
    pub fn set_active_row(&mut self, index: usize) -> bool {
        if index < self.rows.len() {
            self.active_row = index;
            true
        } else {
            false
        }
    }

    fn active_row_mut(&mut self) -> &mut Row {
        self.clamp_active_row();
        &mut self.rows[self.active_row]
    }

    /// Insert an untransformed instance at the end of the active row.
    pub fn insert(&mut self, glyph_id: impl Into<String>) -> InstanceId {
        let instance = GlyphInstance::new(glyph_id);
        let id = instance.id;
        self.active_row_mut().push(instance);
        id
    }

    /// Append instances to the active row in order. Returns their ids.
    pub fn append_instances(&mut self, instances: Vec<GlyphInstance>) -> Vec<InstanceId> {
        let row = self.active_row_mut();
        instances
            .into_iter()
            .map(|instance| {
                let id = instance.id;
                row.push(instance);
                id
            })
            .collect()
    }

    /// Remove instances by id. Returns how many were removed.
    pub fn remove_instances(&mut self, ids: &[InstanceId]) -> usize {
        let before = self.len();
        for row in &mut self.rows {
            row.instances.retain(|instance| !ids.contains(&instance.id));
        }
        before - self.len()
    }

    /// Locate an instance.
    pub fn find(&self, id: InstanceId) -> Option<(Placement, &GlyphInstance)> {
        self.rows.iter().enumerate().find_map(|(row, r)| {
            r.instances
                .iter()
                .position(|instance| instance.id == id)
                .map(|col| (Placement { row, col }, &r.instances[col]))
        })
    }

    pub fn find_mut(&mut self, id: InstanceId) -> Option<&mut GlyphInstance> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.instances.iter_mut())
            .find(|instance| instance.id == id)
    }

    /// All instances in row-major order.
    pub fn instances(&self) -> impl Iterator<Item = &GlyphInstance> {
        self.rows.iter().flat_map(|row| row.instances.iter())
    }

    /// The instance in the cell at `(row, col)`, if any.
    pub fn instance_at(&self, placement: Placement) -> Option<&GlyphInstance> {
        self.rows.get(placement.row)?.instances.get(placement.col)
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_step(&self, quadrat: f64) -> f64 {
        layout::cell_step(&self.rows, quadrat)
    }

    pub fn metrics(&self, quadrat: f64) -> GridMetrics {
        GridMetrics::for_rows(&self.rows, quadrat)
    }

    /// Layout items for every instance at the current cell step.
    pub fn layout(&self, quadrat: f64) -> Vec<LayoutItem<'_>> {
        layout::layout_rows(&self.rows, self.cell_step(quadrat))
    }

    /// Remember a glyph imported into this scene.
    pub fn add_imported_glyph(&mut self, glyph: GlyphDefinition) {
        if !self.imported_glyphs.iter().any(|g| g.id == glyph.id) {
            self.imported_glyphs.push(glyph);
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(json)?;
        document.clamp_active_row();
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::QUADRAT;

    #[test]
    fn test_new_document_has_one_row() {
        let doc = SceneDocument::new();
        assert_eq!(doc.rows.len(), 1);
        assert_eq!(doc.active_row, 0);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_insert_into_active_row() {
        let mut doc = SceneDocument::new();
        doc.insert("A1");
        doc.add_row();
        let id = doc.insert("G17");
        let (placement, instance) = doc.find(id).unwrap();
        assert_eq!(placement, Placement { row: 1, col: 0 });
        assert_eq!(instance.glyph_id, "G17");
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_remove_row_destroys_instances() {
        let mut doc = SceneDocument::new();
        doc.insert("A1");
        doc.add_row();
        doc.insert("B2");
        let removed = doc.remove_row(0).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(doc.active_row, 0);
        assert_eq!(doc.len(), 1);

        doc.remove_row(0);
        assert_eq!(doc.rows.len(), 1);
        assert!(doc.is_empty());
        assert!(doc.remove_row(5).is_none());
    }

    #[test]
    fn test_remove_instances() {
        let mut doc = SceneDocument::new();
        let a = doc.insert("A1");
        let b = doc.insert("B2");
        doc.insert("C3");
        assert_eq!(doc.remove_instances(&[a, b]), 2);
        assert_eq!(doc.rows[0].instances[0].glyph_id, "C3");
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = SceneDocument::new();
        doc.push_undo();
        doc.insert("A1");
        assert!(doc.undo());
        assert!(doc.is_empty());
        assert!(doc.redo());
        assert_eq!(doc.len(), 1);
        assert!(!doc.redo());
    }

    #[test]
    fn test_undo_history_limit() {
        let mut doc = SceneDocument::new();
        for _ in 0..(MAX_UNDO_HISTORY + 10) {
            doc.push_undo();
            doc.insert("A1");
        }
        let mut count = 0;
        while doc.undo() {
            count += 1;
        }
        assert_eq!(count, MAX_UNDO_HISTORY);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = SceneDocument::new();
        let id = doc.insert("G17");
        doc.find_mut(id).unwrap().transform.rotate = 180.0;
        let json = doc.to_json().unwrap();
        let loaded = SceneDocument::from_json(&json).unwrap();
        assert_eq!(loaded.rows, doc.rows);
        assert!(!loaded.can_undo());
    }

    #[test]
    fn test_layout_and_metrics() {
        let mut doc = SceneDocument::new();
        let id = doc.insert("A1");
        doc.insert("B2");
        doc.find_mut(id).unwrap().transform.scale_x = 1.5;
        assert_eq!(doc.cell_step(QUADRAT), 2700.0);
        let items = doc.layout(QUADRAT);
        assert_eq!(items[1].x, 2700.0);
    }
}
