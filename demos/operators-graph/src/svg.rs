//! SVG rendering of the graph.

use crate::types::{GraphNode, GraphState};
use std::fmt::Write as _;

/// Render `nodes` on a `width` × `height` canvas
///
/// Each node is a group translated to its position holding a light blue
/// circle and its centred name.
#[must_use]
pub fn render_svg(nodes: &[GraphNode], width: f64, height: f64) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg id="graph" xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
    );
    svg.push_str("  <g>\n");
    for node in nodes {
        let _ = writeln!(
            svg,
            r#"    <g transform="translate({},{})"><circle r="{}" fill="lightblue"></circle><text text-anchor="middle" dy="4">{}</text></g>"#,
            node.x,
            node.y,
            node.radius(),
            node.name
        );
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Render the current snapshot, or `None` when there is nothing to draw
#[must_use]
pub fn render_state(state: &GraphState, width: f64, height: f64) -> Option<String> {
    state
        .is_drawable()
        .then(|| render_svg(&state.nodes, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphStatus;

    #[test]
    fn renders_one_group_per_node() {
        let nodes = vec![
            GraphNode::at(0, "map", 10.0, 20.5),
            GraphNode::at(1, "filter", -3.0, 4.0),
        ];
        let svg = render_svg(&nodes, 960.0, 600.0);

        assert!(svg.starts_with(r#"<svg id="graph" xmlns="http://www.w3.org/2000/svg" width="960" height="600">"#));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(r#"<g transform="translate(10,20.5)"><circle r="6" fill="lightblue"></circle><text text-anchor="middle" dy="4">map</text></g>"#));
        assert!(svg.contains(r#"translate(-3,4)"><circle r="12""#));
    }

    #[test]
    fn empty_graph_is_an_empty_canvas() {
        let svg = render_svg(&[], 100.0, 50.0);
        assert!(!svg.contains("<circle"));
        assert!(svg.contains(r#"width="100" height="50""#));
    }

    #[test]
    fn failed_pipeline_draws_nothing() {
        let mut state = GraphState::new();
        state.status = GraphStatus::Failed("offline".into());
        assert_eq!(render_state(&state, 960.0, 600.0), None);

        state.status = GraphStatus::Settled;
        assert!(render_state(&state, 960.0, 600.0).is_some());
    }
}
