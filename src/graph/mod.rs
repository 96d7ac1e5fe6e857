mod load;
mod model;
mod types;

pub use load::load_graph;
pub use model::{FilterMode, GraphModel, SimLink, SimNode};
pub use types::{Endpoint, Graph, GraphError, Link, Node, split_resource_type};
