//! Source location tracking.
//!
//! The reader feeds characters one at a time, so locations are tracked as
//! it goes rather than stored on every token. [`LineInfo`] adds the
//! indentation facts blocks need to find their boundaries.

use std::fmt;

/// A position in source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, in characters).
    pub column: u32,
    /// Byte offset from the start of the source.
    pub offset: u32,
}

impl Position {
    /// The position of the first character of a source.
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };

    /// Create a new position.
    #[inline]
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Layout facts about the line an input belongs to.
///
/// Computed by the reader when an input is first read and carried along
/// when the input is replayed, so a node that sees a replayed character
/// gets the same answer as the node that saw it first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LineInfo {
    /// Where the input sits in the source.
    pub position: Position,
    /// Number of space and tab characters that start the line.
    pub indentation: usize,
    /// True when only spaces and tabs precede the input on its line.
    pub at_line_start: bool,
}

impl LineInfo {
    /// Line info for the very first input of a source.
    pub const START: LineInfo = LineInfo {
        position: Position::START,
        indentation: 0,
        at_line_start: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_display() {
        let pos = Position::new(3, 7, 40);
        assert_eq!(pos.to_string(), "3:7");
        assert_eq!(format!("{:?}", pos), "3:7");
    }

    #[test]
    fn start_line_info() {
        let info = LineInfo::START;
        assert!(info.at_line_start);
        assert_eq!(info.indentation, 0);
        assert_eq!(info.position, Position::START);
    }
}
