//! Error types for the GDScript grammar engine.
//!
//! Malformed source text is never an error: the parser quarantines it in
//! invalid-token spans and keeps going. The errors here report that the
//! grammar engine itself broke one of its own rules.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ParseError
//! ├── InvalidState     - a node was handed a value its state forbids
//! ├── StateRegression  - a node tried to move its state backwards
//! ├── Stalled          - one input was re-dispatched without progress
//! ├── EmptyStack       - input arrived with no active node
//! └── UnexpectedRoot   - an entry point finished with the wrong value
//! ```

use thiserror::Error;

use crate::Position;

/// Categories of grammar-engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A receiver got a value its state does not accept.
    InvalidState,
    /// A form state moved backwards.
    StateRegression,
    /// The livelock guard tripped.
    Stalled,
    /// No node was active.
    EmptyStack,
    /// An entry point produced the wrong kind of value.
    UnexpectedRoot,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::InvalidState => "invalid state",
            ParseErrorKind::StateRegression => "state regression",
            ParseErrorKind::Stalled => "stalled",
            ParseErrorKind::EmptyStack => "empty stack",
            ParseErrorKind::UnexpectedRoot => "unexpected root",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure of the grammar engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A node received a value that its current state cannot hold.
    #[error("invalid state: {node} in state {state} cannot accept {received}")]
    InvalidState {
        node: &'static str,
        state: String,
        received: &'static str,
    },

    /// A node tried to return to an earlier state.
    #[error("state regression in {node}: {from} -> {to}")]
    StateRegression {
        node: &'static str,
        from: String,
        to: String,
    },

    /// A single input was re-dispatched too many times.
    #[error("reader stalled at {position} after {steps} dispatches")]
    Stalled { position: Position, steps: usize },

    /// Input arrived after the last active node completed.
    #[error("no active node at {position}")]
    EmptyStack { position: Position },

    /// An entry point completed with a value of the wrong kind.
    #[error("expected {expected} at the root, found {found}")]
    UnexpectedRoot {
        expected: &'static str,
        found: &'static str,
    },
}

impl ParseError {
    /// Build an [`ParseError::InvalidState`] from any debuggable state.
    pub fn invalid_state(
        node: &'static str,
        state: impl std::fmt::Debug,
        received: &'static str,
    ) -> Self {
        ParseError::InvalidState {
            node,
            state: format!("{:?}", state),
            received,
        }
    }

    /// Get the category of this error.
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::InvalidState { .. } => ParseErrorKind::InvalidState,
            ParseError::StateRegression { .. } => ParseErrorKind::StateRegression,
            ParseError::Stalled { .. } => ParseErrorKind::Stalled,
            ParseError::EmptyStack { .. } => ParseErrorKind::EmptyStack,
            ParseError::UnexpectedRoot { .. } => ParseErrorKind::UnexpectedRoot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_message() {
        let err = ParseError::invalid_state("VariableDeclaration", "Type", "expression");
        assert_eq!(err.kind(), ParseErrorKind::InvalidState);
        assert_eq!(
            err.to_string(),
            "invalid state: VariableDeclaration in state \"Type\" cannot accept expression"
        );
    }

    #[test]
    fn stalled_message() {
        let err = ParseError::Stalled {
            position: Position::new(2, 5, 12),
            steps: 10,
        };
        assert_eq!(err.kind(), ParseErrorKind::Stalled);
        assert_eq!(err.to_string(), "reader stalled at 2:5 after 10 dispatches");
    }

    #[test]
    fn kind_names() {
        assert_eq!(ParseErrorKind::EmptyStack.to_string(), "empty stack");
        assert_eq!(ParseErrorKind::UnexpectedRoot.as_str(), "unexpected root");
    }
}
