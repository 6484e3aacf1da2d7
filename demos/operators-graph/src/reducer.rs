//! Reducer driving the scrape-and-layout pipeline.
//!
//! ```text
//! Idle --Load--> Loading --NamesLoaded--> Running --Tick*--> Settled
//!                   \
//!                    `--LoadFailed--> Failed
//! ```
//!
//! Fetching happens in an [`Effect::Future`]; every simulation step is a
//! `Tick` action scheduled with [`Effect::Delay`], so each step produces
//! exactly one snapshot to redraw from.

use crate::extract::extract_names;
use crate::layout::LayoutEngine;
use crate::source::DocumentSource;
use crate::types::{GraphAction, GraphState, GraphStatus, LayoutState};
use foldview_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;
use std::time::Duration;

/// Injected capabilities for the graph reducer
#[derive(Clone)]
pub struct GraphEnvironment {
    /// Where the document comes from
    pub source: Arc<dyn DocumentSource>,
    /// How nodes are placed and relaxed
    pub layout: Arc<dyn LayoutEngine>,
    /// Document to scrape
    pub url: String,
    /// Pause between simulation steps
    pub tick_interval: Duration,
}

impl GraphEnvironment {
    /// Creates a new `GraphEnvironment`
    #[must_use]
    pub fn new(
        source: Arc<dyn DocumentSource>,
        layout: Arc<dyn LayoutEngine>,
        url: impl Into<String>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            source,
            layout,
            url: url.into(),
            tick_interval,
        }
    }
}

impl std::fmt::Debug for GraphEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphEnvironment")
            .field("url", &self.url)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}

type Effects = SmallVec<[Effect<GraphAction>; 4]>;

/// Reducer for the operators graph
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphReducer;

impl GraphReducer {
    /// Creates a new `GraphReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load(state: &mut GraphState, env: &GraphEnvironment) -> Effects {
        if matches!(state.status, GraphStatus::Loading | GraphStatus::Running) {
            tracing::debug!(status = ?state.status, "Load ignored: pipeline busy");
            return SmallVec::new();
        }

        *state = GraphState {
            status: GraphStatus::Loading,
            ..GraphState::new()
        };

        let source = Arc::clone(&env.source);
        let url = env.url.clone();
        smallvec![Effect::Future(Box::pin(async move {
            let action = match source.fetch(&url).await {
                Ok(html) => match extract_names(&html) {
                    Ok(names) => GraphAction::NamesLoaded(names),
                    Err(error) => GraphAction::LoadFailed(error.to_string()),
                },
                Err(error) => GraphAction::LoadFailed(error.to_string()),
            };
            Some(action)
        }))]
    }

    fn names_loaded(state: &mut GraphState, names: Vec<String>, env: &GraphEnvironment) -> Effects {
        if state.status != GraphStatus::Loading {
            tracing::debug!(status = ?state.status, "Late names ignored");
            return SmallVec::new();
        }

        state.nodes = env.layout.place(names);
        state.layout = LayoutState::default();
        state.ticks = 0;

        if state.nodes.is_empty() {
            tracing::warn!(url = %env.url, "No names found; nothing to lay out");
            state.status = GraphStatus::Settled;
            return SmallVec::new();
        }

        tracing::info!(nodes = state.nodes.len(), "Starting simulation");
        state.status = GraphStatus::Running;
        smallvec![Effect::delay(env.tick_interval, GraphAction::Tick)]
    }

    fn tick(state: &mut GraphState, env: &GraphEnvironment) -> Effects {
        if state.status != GraphStatus::Running {
            return SmallVec::new();
        }

        let hot = env.layout.tick(&mut state.layout, &mut state.nodes);
        state.ticks += 1;

        if hot {
            smallvec![Effect::delay(env.tick_interval, GraphAction::Tick)]
        } else {
            tracing::info!(ticks = state.ticks, "Simulation settled");
            state.status = GraphStatus::Settled;
            SmallVec::new()
        }
    }
}

impl Reducer for GraphReducer {
    type State = GraphState;
    type Action = GraphAction;
    type Environment = GraphEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            GraphAction::Load => Self::load(state, env),
            GraphAction::NamesLoaded(names) => Self::names_loaded(state, names, env),
            GraphAction::LoadFailed(reason) => {
                tracing::error!(url = %env.url, %reason, "Failed to build graph");
                state.nodes.clear();
                state.status = GraphStatus::Failed(reason);
                SmallVec::new()
            },
            GraphAction::Tick => Self::tick(state, env),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::layout::ForceLayout;
    use crate::source::StaticDocumentSource;
    use crate::types::{GraphNode, HEIGHT, WIDTH};
    use foldview_testing::{ReducerTest, assertions};

    fn env(source: StaticDocumentSource) -> GraphEnvironment {
        GraphEnvironment::new(
            source.shared(),
            Arc::new(ForceLayout::new(WIDTH, HEIGHT, 1)),
            "https://docs.test/operators",
            Duration::from_millis(1),
        )
    }

    fn running(names: &[&str]) -> GraphState {
        let mut state = GraphState::new();
        state.status = GraphStatus::Running;
        state.nodes = names
            .iter()
            .enumerate()
            .map(|(i, n)| GraphNode::at(i, *n, 0.0, 0.0))
            .collect();
        state
    }

    #[test]
    fn load_starts_fetch() {
        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(GraphState::new())
            .when_action(GraphAction::Load)
            .then_state(|state| assert_eq!(state.status, GraphStatus::Loading))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn load_while_running_is_ignored() {
        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(running(&["map"]))
            .when_action(GraphAction::Load)
            .then_state_unchanged()
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn names_loaded_places_nodes_and_schedules_tick() {
        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(GraphState {
                status: GraphStatus::Loading,
                ..GraphState::new()
            })
            .when_action(GraphAction::NamesLoaded(vec!["map".into(), "filter".into()]))
            .then_state(|state| {
                assert_eq!(state.status, GraphStatus::Running);
                let names: Vec<&str> = state.nodes.iter().map(|n| n.name.as_str()).collect();
                assert_eq!(names, vec!["map", "filter"]);
                assert_eq!(state.nodes[1].id, 1);
            })
            .then_effects(assertions::assert_has_delay_effect)
            .run();
    }

    #[test]
    fn no_names_settles_empty() {
        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(GraphState {
                status: GraphStatus::Loading,
                ..GraphState::new()
            })
            .when_action(GraphAction::NamesLoaded(Vec::new()))
            .then_state(|state| {
                assert_eq!(state.status, GraphStatus::Settled);
                assert!(state.nodes.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failure_leaves_no_nodes() {
        let reason = GraphError::Status {
            url: "https://docs.test/operators".into(),
            status: 500,
        }
        .to_string();

        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(GraphState {
                status: GraphStatus::Loading,
                ..GraphState::new()
            })
            .when_action(GraphAction::LoadFailed(reason.clone()))
            .then_state(move |state| {
                assert_eq!(state.status, GraphStatus::Failed(reason.clone()));
                assert!(state.nodes.is_empty());
                assert!(!state.is_drawable());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn tick_advances_and_reschedules() {
        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(running(&["map", "scan"]))
            .when_action(GraphAction::Tick)
            .then_state(|state| {
                assert_eq!(state.ticks, 1);
                assert!(state.layout.alpha < 1.0);
                assert_eq!(state.status, GraphStatus::Running);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn last_tick_settles() {
        let mut state = running(&["map"]);
        state.layout.alpha = state.layout.alpha_min;

        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(state)
            .when_action(GraphAction::Tick)
            .then_state(|state| assert_eq!(state.status, GraphStatus::Settled))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stray_tick_is_ignored() {
        ReducerTest::new(GraphReducer::new())
            .with_env(env(StaticDocumentSource::new("")))
            .given_state(GraphState::new())
            .when_action(GraphAction::Tick)
            .then_state_unchanged()
            .run();
    }
}
