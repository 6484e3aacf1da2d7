//! Operators graph: scrape a documentation page and lay the names out.
//!
//! 1. [`source`] fetches the page (`https://rxjs.dev/guide/operators` by
//!    default)
//! 2. [`extract`] pulls the operator names out of its tables
//! 3. [`layout`] relaxes the nodes with a force-directed simulation, one
//!    `Tick` action per step
//! 4. [`svg`] draws every snapshot
//!
//! [`reducer::GraphReducer`] ties the stages together as a state machine and
//! [`app::run`] drives it on a store. Any failure is logged once and leaves
//! the canvas empty.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod reducer;
pub mod source;
pub mod svg;
pub mod types;

pub use error::{ConfigError, GraphError};
pub use reducer::{GraphEnvironment, GraphReducer};
pub use types::{GraphAction, GraphNode, GraphState, GraphStatus, LayoutState};
