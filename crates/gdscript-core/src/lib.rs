//! Shared types for the GDScript syntax crates.
//!
//! This crate holds the pieces every other crate in the workspace needs:
//! - [`ParseError`] and [`ParseErrorKind`], the grammar-engine failures
//! - [`Position`] and [`LineInfo`], source locations tracked by the reader

mod error;
mod span;

pub use error::{ParseError, ParseErrorKind};
pub use span::{LineInfo, Position};
