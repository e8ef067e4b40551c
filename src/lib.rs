//! Overlapping community detection on weighted interaction graphs
//! using the clique percolation method

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod pipeline;
pub mod storage;

pub use cluster::{Assignment, Clique, Community, CpmResult};
pub use config::{Config, DuplicatePolicy};
pub use error::{CpmError, Result};
pub use graph::{CompressedGraph, EdgeRecord, NodeRecord};
pub use pipeline::{analyze, Analysis, NodeSummary};
