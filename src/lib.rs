pub mod config;
pub mod force_graph;
pub mod geometry;
pub mod graph;
pub mod physics;
pub mod render;
pub mod util;

pub use config::RenderConfig;
pub use force_graph::{ForceDirectedGraph, ZoomTransform};
pub use graph::{FilterMode, Graph, GraphError, GraphModel, Link, Node, load_graph};
pub use physics::{Phase, Simulation};
pub use render::{Document, ElementId, EventKind, IconMap, RenderTarget, UiAction};
