//! Force-directed layout.
//!
//! [`ForceLayout`] is a small velocity-Verlet simulation with three forces,
//! applied in this order on every tick:
//!
//! 1. many-body charge: every pair repels with `strength * alpha / d²`
//! 2. centering: the whole cloud is shifted so its mean sits on the centre
//! 3. collision: circles of radius `name.len() * 4` are pushed apart, using
//!    the positions they are about to move to
//!
//! Velocities are then damped by `velocity_decay` and added to positions.

use crate::types::{GraphNode, LayoutState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::sync::{Mutex, PoisonError};

/// Capability that places and relaxes nodes
pub trait LayoutEngine: Send + Sync {
    /// Build the initial nodes for `names`, in order
    fn place(&self, names: Vec<String>) -> Vec<GraphNode>;

    /// Advance the simulation one step
    ///
    /// Returns `true` while the simulation is still hot and should keep
    /// ticking.
    fn tick(&self, state: &mut LayoutState, nodes: &mut [GraphNode]) -> bool;
}

/// Spacing of the initial spiral
const INITIAL_RADIUS: f64 = 10.0;
/// Smallest squared distance the charge force divides by
const DISTANCE_MIN2: f64 = 1.0;

/// Charge, centering and collision forces with the usual defaults
#[derive(Debug)]
pub struct ForceLayout {
    center: (f64, f64),
    charge: f64,
    collide_strength: f64,
    jiggle: Mutex<StdRng>,
}

impl ForceLayout {
    /// Layout centred on a `width` × `height` canvas
    ///
    /// `seed` makes the tie-breaking jiggle reproducible.
    #[must_use]
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        Self {
            center: (width / 2.0, height / 2.0),
            charge: -50.0,
            collide_strength: 1.0,
            jiggle: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Sets the many-body strength (negative repels)
    #[must_use]
    pub const fn with_charge(mut self, strength: f64) -> Self {
        self.charge = strength;
        self
    }

    /// Collision radius of a node
    #[allow(clippy::cast_precision_loss)] // Names are short
    fn collide_radius(node: &GraphNode) -> f64 {
        node.name.len() as f64 * 4.0
    }

    /// Tiny random offset used when two nodes coincide
    fn jiggle(&self) -> f64 {
        let mut rng = self.jiggle.lock().unwrap_or_else(PoisonError::into_inner);
        (rng.r#gen::<f64>() - 0.5) * 1e-6
    }

    fn apply_charge(&self, alpha: f64, nodes: &mut [GraphNode]) {
        let n = nodes.len();
        for i in 0..n {
            let (mut vx, mut vy) = (nodes[i].vx, nodes[i].vy);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = nodes[j].x - nodes[i].x;
                let mut dy = nodes[j].y - nodes[i].y;
                let mut l = dx * dx + dy * dy;

                if dx == 0.0 {
                    dx = self.jiggle();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.jiggle();
                    l += dy * dy;
                }
                if l < DISTANCE_MIN2 {
                    l = (DISTANCE_MIN2 * l).sqrt();
                }

                let w = self.charge * alpha / l;
                vx += dx * w;
                vy += dy * w;
            }
            nodes[i].vx = vx;
            nodes[i].vy = vy;
        }
    }

    #[allow(clippy::cast_precision_loss)] // Node counts are small
    fn apply_center(&self, nodes: &mut [GraphNode]) {
        if nodes.is_empty() {
            return;
        }
        let n = nodes.len() as f64;
        let (sx, sy) = nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let shift_x = sx / n - self.center.0;
        let shift_y = sy / n - self.center.1;

        for node in nodes {
            node.x -= shift_x;
            node.y -= shift_y;
        }
    }

    fn apply_collide(&self, nodes: &mut [GraphNode]) {
        let n = nodes.len();
        for i in 0..n {
            let ri = Self::collide_radius(&nodes[i]);
            let ri2 = ri * ri;
            let xi = nodes[i].x + nodes[i].vx;
            let yi = nodes[i].y + nodes[i].vy;

            for j in (i + 1)..n {
                let rj = Self::collide_radius(&nodes[j]);
                let r = ri + rj;
                let mut dx = xi - nodes[j].x - nodes[j].vx;
                let mut dy = yi - nodes[j].y - nodes[j].vy;
                let mut l = dx * dx + dy * dy;

                if l >= r * r {
                    continue;
                }
                if dx == 0.0 {
                    dx = self.jiggle();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.jiggle();
                    l += dy * dy;
                }

                let dist = l.sqrt();
                let push = (r - dist) / dist * self.collide_strength;
                dx *= push;
                dy *= push;

                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                nodes[i].vx += dx * share;
                nodes[i].vy += dy * share;
                nodes[j].vx -= dx * (1.0 - share);
                nodes[j].vy -= dy * (1.0 - share);
            }
        }
    }
}

impl LayoutEngine for ForceLayout {
    /// Phyllotaxis spiral around the origin, at rest.
    #[allow(clippy::cast_precision_loss)] // Node counts are small
    fn place(&self, names: Vec<String>) -> Vec<GraphNode> {
        let angle_step = PI * (3.0 - 5f64.sqrt());
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * angle_step;
                GraphNode::at(i, name, radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }

    fn tick(&self, state: &mut LayoutState, nodes: &mut [GraphNode]) -> bool {
        state.alpha += (state.alpha_target - state.alpha) * state.alpha_decay;
        let alpha = state.alpha;

        self.apply_charge(alpha, nodes);
        self.apply_center(nodes);
        self.apply_collide(nodes);

        let keep = 1.0 - state.velocity_decay;
        for node in nodes.iter_mut() {
            node.vx *= keep;
            node.vy *= keep;
            node.x += node.vx;
            node.y += node.vy;
        }

        !state.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HEIGHT, WIDTH};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn run_to_rest(layout: &ForceLayout, nodes: &mut [GraphNode]) -> u64 {
        let mut state = LayoutState::default();
        let mut ticks = 0;
        while layout.tick(&mut state, nodes) {
            ticks += 1;
        }
        ticks + 1
    }

    #[test]
    fn place_spirals_out_from_origin() {
        let layout = ForceLayout::new(WIDTH, HEIGHT, 1);
        let nodes = layout.place(names(&["a", "b", "c"]));

        assert_eq!(nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!((nodes[0].x - 10.0 * 0.5f64.sqrt()).abs() < 1e-9);
        assert!(nodes[0].y.abs() < 1e-9);
        let d1 = nodes[1].x.hypot(nodes[1].y);
        let d2 = nodes[2].x.hypot(nodes[2].y);
        assert!(d1 < d2);
        assert!(nodes.iter().all(|n| n.vx == 0.0 && n.vy == 0.0));
    }

    #[test]
    fn cloud_ends_up_centred() {
        let layout = ForceLayout::new(WIDTH, HEIGHT, 7);
        let mut nodes = layout.place(names(&["map", "filter", "merge", "scan", "take"]));
        run_to_rest(&layout, &mut nodes);

        #[allow(clippy::cast_precision_loss)]
        let n = nodes.len() as f64;
        let mx = nodes.iter().map(|p| p.x).sum::<f64>() / n;
        let my = nodes.iter().map(|p| p.y).sum::<f64>() / n;
        assert!((mx - WIDTH / 2.0).abs() < 5.0, "mean x = {mx}");
        assert!((my - HEIGHT / 2.0).abs() < 5.0, "mean y = {my}");
    }

    #[test]
    fn overlapping_nodes_are_pushed_apart() {
        let layout = ForceLayout::new(WIDTH, HEIGHT, 3).with_charge(0.0);
        let mut nodes = vec![
            GraphNode::at(0, "concat", 480.0, 300.0),
            GraphNode::at(1, "concat", 481.0, 300.0),
        ];
        run_to_rest(&layout, &mut nodes);

        let gap = (nodes[0].x - nodes[1].x).hypot(nodes[0].y - nodes[1].y);
        assert!(gap > 30.0, "gap = {gap}");
    }

    #[test]
    fn coincident_nodes_are_separated() {
        let layout = ForceLayout::new(WIDTH, HEIGHT, 11);
        let mut nodes = vec![
            GraphNode::at(0, "of", 100.0, 100.0),
            GraphNode::at(1, "of", 100.0, 100.0),
        ];
        let mut state = LayoutState::default();
        for _ in 0..50 {
            layout.tick(&mut state, &mut nodes);
        }
        assert!(nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
        assert!((nodes[0].x - nodes[1].x).abs() + (nodes[0].y - nodes[1].y).abs() > 1.0);
    }

    #[test]
    fn simulation_stops_after_cooling() {
        let layout = ForceLayout::new(WIDTH, HEIGHT, 5);
        let mut nodes = layout.place(names(&["a", "b"]));
        let ticks = run_to_rest(&layout, &mut nodes);
        assert!((299..=301).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn same_seed_same_layout() {
        let run = || {
            let layout = ForceLayout::new(WIDTH, HEIGHT, 42);
            let mut nodes = vec![
                GraphNode::at(0, "zip", 0.0, 0.0),
                GraphNode::at(1, "zip", 0.0, 0.0),
            ];
            run_to_rest(&layout, &mut nodes);
            nodes
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn empty_graph_just_cools() {
        let layout = ForceLayout::new(WIDTH, HEIGHT, 0);
        let mut nodes: Vec<GraphNode> = Vec::new();
        let mut state = LayoutState::default();
        assert!(layout.tick(&mut state, &mut nodes));
        assert!(state.alpha < 1.0);
    }
}
