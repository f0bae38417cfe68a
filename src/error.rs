//! Caller-facing error taxonomy.
//!
//! Only the errors that are genuinely the caller's fault (an unknown node
//! id, a bad `Config`) are ever returned as `Err`. Everything else —
//! infeasibility, timeouts, missing candidates, malformed graph data — is
//! recovered locally or folded into a `RouteResult` with
//! `path_found: false`.

use crate::graph::NodeId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("node {0} is not present in the graph")]
    NotFound(NodeId),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type RouteOutcome<T> = std::result::Result<T, RouteError>;
