//! Image nodes, as supplied by the data provider.

mod node;

pub use node::{Node, NodeFill, NodeId};
