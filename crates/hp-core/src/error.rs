//! Error taxonomy shared by the graph store, the record boundary, and the
//! save bridge.

use thiserror::Error;

/// Why an edge could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointProblem {
    /// The source hexagon is not in the graph.
    MissingSource,
    /// The target hexagon is not in the graph.
    MissingTarget,
    /// Source and target are the same hexagon.
    SelfLoop,
}

impl std::fmt::Display for EndpointProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EndpointProblem::MissingSource => "source hexagon does not exist",
            EndpointProblem::MissingTarget => "target hexagon does not exist",
            EndpointProblem::SelfLoop => "a hexagon cannot connect to itself",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HexError {
    /// A mutation referenced an ID that is not in the current graph.
    #[error("not found: {0}")]
    NotFound(String),

    /// Edge creation with a missing or identical endpoint.
    #[error("invalid connection {from} -> {to}: {problem}")]
    InvalidEndpoint {
        from: String,
        to: String,
        problem: EndpointProblem,
    },

    /// An entity with this ID is already in the graph.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A record from the persistence collaborator failed validation.
    #[error("invalid planner record: {0}")]
    InvalidRecord(String),

    /// The persistence collaborator reported an error (or timed out).
    #[error("save failed: {0}")]
    PersistenceFailure(String),
}

impl HexError {
    /// Whether this error came from the persistence path (and should be shown
    /// to the user) rather than from a local graph operation.
    pub fn is_persistence(&self) -> bool {
        matches!(self, HexError::PersistenceFailure(_))
    }
}

pub type HexResult<T> = Result<T, HexError>;
