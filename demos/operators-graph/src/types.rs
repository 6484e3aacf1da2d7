//! Domain types for the operators graph.

use serde::{Deserialize, Serialize};

/// Default canvas width
pub const WIDTH: f64 = 960.0;
/// Default canvas height
pub const HEIGHT: f64 = 600.0;

/// One operator name placed on the canvas
///
/// `id` is the name's index in extraction order. Positions and velocities
/// are owned by the layout engine and mutated on every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Index in extraction order
    pub id: usize,
    /// Operator name, already trimmed
    pub name: String,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Horizontal velocity
    pub vx: f64,
    /// Vertical velocity
    pub vy: f64,
}

impl GraphNode {
    /// Node at rest at `(x, y)`
    #[must_use]
    pub fn at(id: usize, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Circle radius drawn for this node
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Names are short
    pub fn radius(&self) -> f64 {
        self.name.len() as f64 * 2.0
    }
}

/// Cooling schedule of the simulation
///
/// Each tick moves `alpha` towards `alpha_target` by `alpha_decay`; the
/// simulation is settled once `alpha` drops below `alpha_min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
    /// Current temperature
    pub alpha: f64,
    /// Temperature below which the simulation stops
    pub alpha_min: f64,
    /// Fraction of the gap to `alpha_target` closed per tick
    pub alpha_decay: f64,
    /// Temperature the simulation cools towards
    pub alpha_target: f64,
    /// Fraction of velocity lost per tick
    pub velocity_decay: f64,
}

impl LayoutState {
    /// Whether the simulation has cooled down
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.alpha < self.alpha_min
    }
}

/// Defaults: roughly 300 ticks from a full start to rest.
impl Default for LayoutState {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
        }
    }
}

/// Where the pipeline is
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphStatus {
    /// Nothing requested yet
    Idle,
    /// Document requested
    Loading,
    /// Simulation ticking
    Running,
    /// Simulation cooled down
    Settled,
    /// Fetch or extraction failed; the graph will not be drawn
    Failed(String),
}

/// Whole pipeline state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    /// Pipeline stage
    pub status: GraphStatus,
    /// Nodes in extraction order
    pub nodes: Vec<GraphNode>,
    /// Cooling schedule
    pub layout: LayoutState,
    /// Ticks run so far
    pub ticks: u64,
}

impl GraphState {
    /// Empty, idle pipeline
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: GraphStatus::Idle,
            nodes: Vec::new(),
            layout: LayoutState::default(),
            ticks: 0,
        }
    }

    /// Whether the graph should be drawn
    #[must_use]
    pub const fn is_drawable(&self) -> bool {
        matches!(self.status, GraphStatus::Running | GraphStatus::Settled)
    }

    /// Whether the pipeline has nothing left to do
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.status, GraphStatus::Settled | GraphStatus::Failed(_))
    }
}

impl Default for GraphState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs to the graph reducer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GraphAction {
    /// Fetch the document and extract names
    Load,
    /// Extraction succeeded
    NamesLoaded(Vec<String>),
    /// Fetch or extraction failed
    LoadFailed(String),
    /// Advance the simulation one step
    Tick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_settles_after_about_300_ticks() {
        let mut layout = LayoutState::default();
        let mut ticks = 0;
        while !layout.is_settled() {
            layout.alpha += (layout.alpha_target - layout.alpha) * layout.alpha_decay;
            ticks += 1;
        }
        assert!((299..=301).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn radius_scales_with_name() {
        assert!((GraphNode::at(0, "map", 0.0, 0.0).radius() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn only_running_or_settled_is_drawable() {
        let mut state = GraphState::new();
        assert!(!state.is_drawable());
        state.status = GraphStatus::Failed("boom".into());
        assert!(!state.is_drawable());
        assert!(state.is_finished());
        state.status = GraphStatus::Running;
        assert!(state.is_drawable());
        assert!(!state.is_finished());
    }
}
