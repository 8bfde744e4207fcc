use std::fmt;

use gdscript_core::ParseError;

use super::chars::is_node_path_char;
use super::trivia::LineEnding;
use crate::node::{Leaf, SyntaxNode};
use crate::reader::{ReadContext, Resolve, Resolved, Step};

/// The unquoted path of `$Path/To/Node` or `%Unique`, without its sigil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    path: String,
}

impl NodePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The `/`-separated names of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl SyntaxNode for NodePath {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::NodePath(self));
    }
}

#[derive(Debug, Default)]
pub(crate) struct NodePathReader {
    path: String,
}

impl NodePathReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resolve for NodePathReader {
    fn name(&self) -> &'static str {
        "NodePath"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        if is_node_path_char(c) {
            self.path.push(c);
            Ok(Step::Consumed)
        } else {
            Ok(Step::Pop)
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::NodePath(NodePath::new(self.path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_on_slashes() {
        let path = NodePath::new("UI/Health/Bar");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["UI", "Health", "Bar"]);
        assert_eq!(path.to_string(), "UI/Health/Bar");
    }
}
