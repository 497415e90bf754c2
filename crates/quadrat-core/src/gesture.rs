//! Pointer gesture state machine for moving, rotating and scaling a selection.
//!
//! Every update is computed from the state captured when the drag began, not
//! from the previous frame, so replaying the same pointer positions always
//! produces the same result. Each update is applied immediately; releasing
//! the pointer just stops the drag.

use crate::config::ScaleBounds;
use crate::handles::DragMode;
use crate::instance::{InstanceId, TransformState};
use crate::snap::{SnapMode, wrap_degrees};
use kurbo::{Point, Vec2};

/// Everything captured at drag start.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub mode: DragMode,
    /// Pointer position at drag start, canvas units.
    pub start_point: Point,
    /// Rotation and scale origin.
    pub pivot: Point,
    /// Angle of the start point around the pivot, radians.
    pub start_angle: f64,
    /// Distance of the start point from the pivot; never zero.
    pub start_distance: f64,
    /// Horizontal and vertical distance from the pivot; never zero.
    pub start_axis_distance: Vec2,
    /// Canvas units per glyph unit, for converting move deltas to offsets.
    pub offset_scale: f64,
    /// Quadrat edge used by grid snapping.
    pub quadrat: f64,
    pub snap: SnapMode,
    /// Shared pivot handed to the compositor while a group is dragged.
    pub group_pivot: Option<Point>,
    /// Transform state of every dragged instance at drag start.
    pub originals: Vec<(InstanceId, TransformState)>,
}

/// Parameters for starting a drag.
#[derive(Debug, Clone)]
pub struct DragStart {
    pub mode: DragMode,
    pub point: Point,
    pub pivot: Point,
    pub offset_scale: f64,
    pub quadrat: f64,
    pub snap: SnapMode,
    pub originals: Vec<(InstanceId, TransformState)>,
}

/// Gesture machine states.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// One drag at a time per canvas.
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
}

fn nonzero(value: f64) -> f64 {
    if value.abs() < f64::EPSILON || !value.is_finite() { 1.0 } else { value }
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            GestureState::Dragging(session) => Some(session),
            GestureState::Idle => None,
        }
    }

    /// Pivot override for the compositor, present while a group is dragged.
    pub fn group_pivot(&self) -> Option<Point> {
        self.session().and_then(|session| session.group_pivot)
    }

    /// Enter `dragging(mode)`. A drag already in progress is replaced.
    pub fn begin(&mut self, start: DragStart) {
        let arm = start.point - start.pivot;
        let group_pivot = (start.originals.len() > 1 && start.mode != DragMode::Move)
            .then_some(start.pivot);
        log::debug!(
            "Drag {:?} started on {} instance(s)",
            start.mode,
            start.originals.len()
        );
        self.state = GestureState::Dragging(DragSession {
            mode: start.mode,
            start_point: start.point,
            pivot: start.pivot,
            start_angle: arm.atan2(),
            start_distance: nonzero(arm.hypot()),
            start_axis_distance: Vec2::new(nonzero(arm.x.abs()), nonzero(arm.y.abs())),
            offset_scale: nonzero(start.offset_scale),
            quadrat: start.quadrat,
            snap: start.snap,
            group_pivot,
            originals: start.originals,
        });
    }

    /// New transform states for the pointer at `point`, or nothing when idle.
    pub fn update(&self, point: Point, bounds: &ScaleBounds) -> Vec<(InstanceId, TransformState)> {
        let Some(session) = self.session() else {
            return Vec::new();
        };
        session
            .originals
            .iter()
            .map(|(id, original)| (*id, session.apply(original, point, bounds)))
            .collect()
    }

    /// Leave `dragging` on pointer up, leave or capture loss.
    pub fn end(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            GestureState::Dragging(session) => {
                log::debug!("Drag {:?} ended", session.mode);
                Some(session)
            }
            GestureState::Idle => None,
        }
    }
}

impl DragSession {
    /// Transform state of one instance for the pointer at `point`.
    pub fn apply(&self, original: &TransformState, point: Point, bounds: &ScaleBounds) -> TransformState {
        let mut state = *original;
        let arm = point - self.pivot;
        match self.mode {
            DragMode::Move => {
                let delta = (point - self.start_point) / self.offset_scale;
                state.offset = self.snap.apply(original.offset + delta, self.quadrat);
            }
            DragMode::Rotate => {
                let delta = (arm.atan2() - self.start_angle).to_degrees();
                state.rotate = wrap_degrees((original.rotate + delta).round());
            }
            DragMode::ScaleUniform => {
                let ratio = arm.hypot() / self.start_distance;
                state.scale = bounds.clamp(original.scale * ratio);
                state.scale_x = bounds.clamp(original.scale_x * ratio);
                state.scale_y = bounds.clamp(original.scale_y * ratio);
            }
            DragMode::ScaleX => {
                let ratio = arm.x.abs() / self.start_axis_distance.x;
                state.scale_x = bounds.clamp(original.scale_x * ratio);
            }
            DragMode::ScaleY => {
                let ratio = arm.y.abs() / self.start_axis_distance.y;
                state.scale_y = bounds.clamp(original.scale_y * ratio);
            }
        }
        state
    }
}
