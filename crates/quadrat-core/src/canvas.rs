//! Canvas state: scene, selection, camera, gesture and clipboard commands.

use crate::bounds::{self, Measurement, SelectionBounds};
use crate::camera::Camera;
use crate::catalog::GlyphCatalog;
use crate::clipboard::{ClipboardBackend, ClipboardResult, WriteMode, write_export};
use crate::config::{EditorConfig, PresetScales};
use crate::gesture::{DragStart, GestureMachine};
use crate::glyph::GlyphDefinition;
use crate::handles::{self, DragMode, HandleMetrics};
use crate::instance::{GlyphInstance, InstanceId, TransformState};
use crate::interchange::{ImportOutcome, PasteSource, SAMPLE_FOREIGN_SVG, export_svg, import_clipboard};
use crate::layout::GridMetrics;
use crate::probe::BoundsProbe;
use crate::scene::{Placement, SceneDocument};
use crate::snap::SnapMode;
use crate::transform::{TransformChain, compose};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Export scale presets for copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyPreset {
    Small,
    #[default]
    Large,
    /// Matches the current on-screen zoom.
    Wysiwyg,
}

impl CopyPreset {
    pub fn export_scale(self, presets: &PresetScales, zoom: f64) -> f64 {
        match self {
            CopyPreset::Small => presets.small,
            CopyPreset::Large => presets.large,
            CopyPreset::Wysiwyg => zoom,
        }
    }
}

impl fmt::Display for CopyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CopyPreset::Small => "small",
            CopyPreset::Large => "large",
            CopyPreset::Wysiwyg => "wysiwyg",
        })
    }
}

/// Result of a copy command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied {
        count: usize,
        mode: WriteMode,
        preset: CopyPreset,
    },
    /// The selection (or scene) had nothing renderable; the clipboard was untouched.
    NothingToCopy,
}

impl CopyOutcome {
    pub fn status_message(&self) -> String {
        match self {
            CopyOutcome::Copied { count, mode: WriteMode::Rich, preset } => {
                format!("Copied {count} glyphs ({preset})")
            }
            CopyOutcome::Copied { mode: WriteMode::TextOnly, .. } => {
                "Copied plain text only (clipboard does not allow SVG here)".to_string()
            }
            CopyOutcome::NothingToCopy => "Nothing to copy".to_string(),
        }
    }
}

/// Result of a paste command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    Pasted { count: usize, source: PasteSource },
    ImportedGlyph { glyph_id: String },
    NothingRecognized,
}

impl PasteOutcome {
    pub fn status_message(&self) -> String {
        match self {
            PasteOutcome::Pasted { count, source: PasteSource::Svg } => {
                format!("Pasted {count} glyphs from SVG")
            }
            PasteOutcome::Pasted { count, source: PasteSource::GlyphIds } => {
                format!("Pasted {count} glyph ids")
            }
            PasteOutcome::ImportedGlyph { .. } => "Imported external SVG as a glyph".to_string(),
            PasteOutcome::NothingRecognized => "Paste contained no recognized glyphs".to_string(),
        }
    }
}

/// One renderable instance for the current frame.
#[derive(Debug, Clone)]
pub struct RenderItem<'a> {
    pub instance: &'a GlyphInstance,
    pub glyph: &'a GlyphDefinition,
    pub placement: Placement,
    pub transform: TransformChain,
    pub selected: bool,
}

/// Runtime canvas state.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub document: SceneDocument,
    pub catalog: GlyphCatalog,
    pub camera: Camera,
    pub config: EditorConfig,
    selection: Vec<InstanceId>,
    gesture: GestureMachine,
    measurement: Option<Measurement>,
}

impl Canvas {
    pub fn new(catalog: GlyphCatalog, config: EditorConfig) -> Self {
        Self::with_document(SceneDocument::new(), catalog, config)
    }

    /// Open a scene; glyphs it imported earlier are added to the catalog.
    pub fn with_document(document: SceneDocument, mut catalog: GlyphCatalog, config: EditorConfig) -> Self {
        for glyph in &document.imported_glyphs {
            if !catalog.contains(&glyph.id) {
                catalog.insert(glyph.clone());
            }
        }
        Self {
            document,
            catalog,
            camera: Camera::new(),
            config,
            selection: Vec::new(),
            gesture: GestureMachine::new(),
            measurement: None,
        }
    }

    pub fn metrics(&self) -> GridMetrics {
        self.document.metrics(self.config.quadrat)
    }

    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    // --- Selection ---

    /// Selected instance ids, in selection order.
    pub fn selection(&self) -> &[InstanceId] {
        &self.selection
    }

    pub fn is_selected(&self, id: InstanceId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection with a single instance.
    pub fn select(&mut self, id: InstanceId) {
        self.selection.clear();
        self.selection.push(id);
        self.measurement = None;
    }

    /// Add or remove one instance (shift/ctrl click).
    pub fn toggle_selection(&mut self, id: InstanceId) {
        if let Some(index) = self.selection.iter().position(|&s| s == id) {
            self.selection.remove(index);
        } else {
            self.selection.push(id);
        }
        self.measurement = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.measurement = None;
    }

    pub fn select_all(&mut self) {
        self.selection = self.document.instances().map(|i| i.id).collect();
        self.measurement = None;
    }

    /// Delete the selected instances.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.document.push_undo();
        let removed = self.document.remove_instances(&self.selection);
        self.selection.clear();
        self.measurement = None;
        removed
    }

    /// Drop selected ids that no longer exist (after undo/redo or row removal).
    fn prune_selection(&mut self) {
        let document = &self.document;
        self.selection.retain(|&id| document.find(id).is_some());
        self.measurement = None;
    }

    pub fn undo(&mut self) -> bool {
        let done = self.document.undo();
        self.prune_selection();
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.document.redo();
        self.prune_selection();
        done
    }

    /// Remove a row and its instances.
    pub fn remove_row(&mut self, index: usize) -> bool {
        self.document.push_undo();
        let removed = self.document.remove_row(index).is_some();
        self.prune_selection();
        removed
    }

    /// Insert a glyph into the active row, if the catalog knows it.
    pub fn insert_glyph(&mut self, glyph_id: &str) -> Option<InstanceId> {
        if !self.catalog.contains(glyph_id) {
            log::warn!("Cannot insert unknown glyph {glyph_id}");
            return None;
        }
        self.document.push_undo();
        Some(self.document.insert(glyph_id))
    }

    // --- Discrete transform commands ---

    fn update_selected(&mut self, mut update: impl FnMut(&mut TransformState)) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.document.push_undo();
        for &id in &self.selection {
            if let Some(instance) = self.document.find_mut(id) {
                update(&mut instance.transform);
            }
        }
        self.measurement = None;
        true
    }

    /// Rotate every selected instance by a quarter turn.
    pub fn rotate_selected_90(&mut self) -> bool {
        self.update_selected(|state| state.rotate_by(90.0))
    }

    pub fn flip_selected_horizontal(&mut self) -> bool {
        self.update_selected(|state| state.flip_x = !state.flip_x)
    }

    pub fn flip_selected_vertical(&mut self) -> bool {
        self.update_selected(|state| state.flip_y = !state.flip_y)
    }

    /// Set scale, scale-x and scale-y of the selection to one clamped value.
    pub fn set_selected_scale(&mut self, value: f64) -> bool {
        let bounds = self.config.scale_bounds;
        self.update_selected(|state| state.set_uniform_scale(value, &bounds))
    }

    /// Scroll-wheel scaling: shrink on positive delta, grow otherwise.
    pub fn wheel_scale(&mut self, delta_y: f64) -> bool {
        let bounds = self.config.scale_bounds;
        let step = if delta_y > 0.0 { -self.config.wheel_step } else { self.config.wheel_step };
        self.update_selected(|state| state.set_uniform_scale(state.scale + step, &bounds))
    }

    /// Shift the selection's offsets by a delta in glyph units.
    pub fn nudge_selected(&mut self, delta: Vec2) -> bool {
        self.update_selected(|state| state.offset += delta)
    }

    // --- Bounds and handles ---

    /// Record the painted screen corners of an instance.
    pub fn set_measurement(&mut self, measurement: Measurement) {
        self.measurement = Some(measurement);
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    /// Precise or estimated bounds of the selection, if available.
    pub fn selection_bounds(&self) -> Option<SelectionBounds> {
        let metrics = self.metrics();
        let items = self.document.layout(self.config.quadrat);
        bounds::selection_bounds(
            &items,
            &self.selection,
            &self.catalog,
            &metrics,
            self.measurement.as_ref(),
            &self.camera,
            self.gesture.group_pivot(),
        )
    }

    /// Selection bounds, falling back to the first selected instance's cell.
    pub fn selection_box(&self) -> Option<SelectionBounds> {
        self.selection_bounds().or_else(|| {
            let placement = self.selection.iter().find_map(|&id| self.document.find(id))?.0;
            Some(bounds::fallback_bounds(&self.metrics(), placement.row, placement.col))
        })
    }

    pub fn handle_metrics(&self) -> HandleMetrics {
        HandleMetrics::new(&self.config, &self.camera)
    }

    /// The instance whose cell contains a canvas point.
    pub fn instance_at(&self, point: Point) -> Option<InstanceId> {
        let step = self.metrics().cell_step;
        if point.x < 0.0 || point.y < 0.0 || step <= 0.0 {
            return None;
        }
        let placement = Placement {
            row: (point.y / step).floor() as usize,
            col: (point.x / step).floor() as usize,
        };
        self.document.instance_at(placement).map(|i| i.id)
    }

    // --- Pointer gestures ---

    /// Pointer pressed at a screen position.
    ///
    /// Handles and the selection body start a drag. A click on an instance
    /// selects it (or toggles it with `multi`) and, without `multi`, starts a
    /// move drag. A click on empty canvas clears the selection.
    pub fn pointer_down(&mut self, screen: Point, multi: bool) -> Option<DragMode> {
        let point = self.camera.screen_to_canvas(screen);

        if !multi {
            if let Some(bounds) = self.selection_box() {
                if let Some(mode) = handles::hit_test_selection(&bounds, point, &self.handle_metrics()) {
                    self.begin_drag(mode, point, bounds.center());
                    return Some(mode);
                }
            }
        }

        match self.instance_at(point) {
            Some(id) if multi => {
                self.toggle_selection(id);
                None
            }
            Some(id) => {
                if !self.is_selected(id) {
                    self.select(id);
                }
                let pivot = self.selection_box().map_or(point, |b| b.center());
                self.begin_drag(DragMode::Move, point, pivot);
                Some(DragMode::Move)
            }
            None => {
                if !multi {
                    self.clear_selection();
                }
                None
            }
        }
    }

    fn begin_drag(&mut self, mode: DragMode, point: Point, pivot: Point) {
        let originals: Vec<_> = self
            .selection
            .iter()
            .filter_map(|&id| self.document.find(id).map(|(_, i)| (id, i.transform)))
            .collect();
        if originals.is_empty() {
            return;
        }
        let snap = if originals.len() == 1 { self.config.move_snap } else { SnapMode::None };
        let metrics = self.metrics();
        self.document.push_undo();
        self.gesture.begin(DragStart {
            mode,
            point,
            pivot,
            offset_scale: metrics.offset_scale(),
            quadrat: metrics.quadrat,
            snap,
            originals,
        });
    }

    /// Pointer moved; applies the drag immediately. Returns true if anything changed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        if !self.gesture.is_dragging() {
            return false;
        }
        let point = self.camera.screen_to_canvas(screen);
        let states = self.gesture.update(point, &self.config.scale_bounds);
        for (id, state) in states {
            if let Some(instance) = self.document.find_mut(id) {
                instance.transform = state;
            }
        }
        self.measurement = None;
        true
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) -> bool {
        self.gesture.end().is_some()
    }

    /// Pointer left the canvas while dragging.
    pub fn pointer_leave(&mut self) -> bool {
        self.gesture.end().is_some()
    }

    /// Pointer capture was lost.
    pub fn pointer_capture_lost(&mut self) -> bool {
        self.gesture.end().is_some()
    }

    // --- Rendering ---

    /// Render transforms for every instance whose glyph is known.
    pub fn render_items(&self) -> Vec<RenderItem<'_>> {
        let metrics = self.metrics();
        let group_pivot = self.gesture.group_pivot();
        self.document
            .layout(self.config.quadrat)
            .into_iter()
            .filter_map(|item| {
                let Some(glyph) = self.catalog.get(&item.instance.glyph_id) else {
                    log::debug!("Skipping instance of missing glyph {}", item.instance.glyph_id);
                    return None;
                };
                let selected = self.is_selected(item.instance.id);
                let pivot = if selected { group_pivot } else { None };
                Some(RenderItem {
                    instance: item.instance,
                    glyph,
                    placement: Placement { row: item.row, col: item.col },
                    transform: compose(&item, glyph, &metrics, pivot),
                    selected,
                })
            })
            .collect()
    }

    // --- Clipboard ---

    /// Copy the selection, or the whole scene when nothing is selected.
    pub async fn copy_selection<B>(&self, backend: &B, preset: CopyPreset) -> ClipboardResult<CopyOutcome>
    where
        B: ClipboardBackend + ?Sized,
    {
        let scale = preset.export_scale(&self.config.presets, self.camera.zoom);
        let selection = &self.selection;
        let whole_scene = selection.is_empty();
        let Some(export) = export_svg(
            &self.document.rows,
            |instance| whole_scene || selection.contains(&instance.id),
            &self.catalog,
            self.config.quadrat,
            scale,
        ) else {
            return Ok(CopyOutcome::NothingToCopy);
        };

        let mode = write_export(backend, &export.svg, &export.text)
            .await
            .inspect_err(|err| log::error!("Copy failed: {err}"))?;
        let outcome = CopyOutcome::Copied { count: export.count, mode, preset };
        log::info!("{}", outcome.status_message());
        Ok(outcome)
    }

    /// Copy a built-in foreign SVG sample.
    pub async fn copy_sample_svg<B>(&self, backend: &B) -> ClipboardResult<WriteMode>
    where
        B: ClipboardBackend + ?Sized,
    {
        write_export(backend, SAMPLE_FOREIGN_SVG, "external-svg").await
    }

    /// Paste clipboard contents into the active row and select them.
    pub async fn paste<B>(&mut self, backend: &B, probe: &dyn BoundsProbe) -> ClipboardResult<PasteOutcome>
    where
        B: ClipboardBackend + ?Sized,
    {
        let contents = backend
            .read()
            .await
            .inspect_err(|err| log::error!("Paste failed: {err}"))?;
        let outcome = match import_clipboard(&contents, &self.catalog, &self.config.scale_bounds, probe) {
            ImportOutcome::Instances { instances, source } => {
                self.document.push_undo();
                let ids = self.document.append_instances(instances);
                let count = ids.len();
                self.selection = ids;
                PasteOutcome::Pasted { count, source }
            }
            ImportOutcome::ForeignGlyph(glyph) => {
                let glyph_id = glyph.id.clone();
                self.catalog.insert(glyph.clone());
                self.document.add_imported_glyph(glyph);
                self.document.push_undo();
                let id = self.document.insert(glyph_id.clone());
                self.selection = vec![id];
                PasteOutcome::ImportedGlyph { glyph_id }
            }
            ImportOutcome::NothingRecognized => PasteOutcome::NothingRecognized,
        };
        self.measurement = None;
        log::info!("{}", outcome.status_message());
        Ok(outcome)
    }
}
