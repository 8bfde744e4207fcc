//! Sequences of nodes with the trivia and separators between them.

use std::fmt;

use gdscript_core::ParseError;

use crate::expr::ExpressionFlags;
use crate::node::{Leaf, SyntaxNode};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    CommentReader, InvalidTokenReader, LineEnding, Punct, Space, Terminator, Trivia, is_space,
};

/// One piece of a [`SyntaxList`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListPart<T> {
    Trivia(Trivia),
    Item(T),
    Separator(Punct),
}

/// Items in source order, interleaved with separators and trivia.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxList<T> {
    parts: Vec<ListPart<T>>,
}

impl<T> Default for SyntaxList<T> {
    fn default() -> Self {
        Self { parts: Vec::new() }
    }
}

impl<T> SyntaxList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every part, trivia and separators included.
    pub fn parts(&self) -> &[ListPart<T>] {
        &self.parts
    }

    pub fn items(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.parts.iter().filter_map(|part| match part {
            ListPart::Item(item) => Some(item),
            _ => None,
        })
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.parts.iter_mut().filter_map(|part| match part {
            ListPart::Item(item) => Some(item),
            _ => None,
        })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    pub fn first(&self) -> Option<&T> {
        self.items().next()
    }

    pub fn last(&self) -> Option<&T> {
        self.items().next_back()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items().nth(index)
    }

    pub fn push_item(&mut self, item: T) {
        self.parts.push(ListPart::Item(item));
    }

    pub fn push_separator(&mut self, punct: Punct) {
        self.parts.push(ListPart::Separator(punct));
    }

    /// Append trivia, merging adjacent spaces.
    pub fn push_trivia(&mut self, trivia: Trivia) {
        if let (Trivia::Space(space), Some(ListPart::Trivia(Trivia::Space(prev)))) =
            (&trivia, self.parts.last_mut())
        {
            prev.push_str(space.as_str());
            return;
        }
        self.parts.push(ListPart::Trivia(trivia));
    }

    pub(crate) fn push_space(&mut self, c: char) {
        if let Some(ListPart::Trivia(Trivia::Space(prev))) = self.parts.last_mut() {
            prev.push(c);
        } else {
            self.parts
                .push(ListPart::Trivia(Trivia::Space(Space::from_char(c))));
        }
    }

    pub(crate) fn extend_trivia(&mut self, trivia: impl IntoIterator<Item = Trivia>) {
        for t in trivia {
            self.push_trivia(t);
        }
    }
}

impl<T: SyntaxNode> SyntaxNode for SyntaxList<T> {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        for part in &self.parts {
            match part {
                ListPart::Trivia(t) => visit(Leaf::Trivia(t)),
                ListPart::Item(item) => item.walk(visit),
                ListPart::Separator(p) => visit(Leaf::Punct(*p)),
            }
        }
    }
}

impl<T: SyntaxNode> fmt::Display for SyntaxList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::node::write_node(self, f)
    }
}

/// A comma-separated list between brackets: `(a, b)`, `[1, 2]`, `{k: v}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketedList<T> {
    open: Punct,
    items: SyntaxList<T>,
    close: Option<Punct>,
}

impl<T> BracketedList<T> {
    pub fn open(&self) -> Punct {
        self.open
    }

    /// The items between the brackets, with their commas and trivia.
    pub fn list(&self) -> &SyntaxList<T> {
        &self.items
    }

    pub fn items(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.items()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Whether the closing bracket was found.
    pub fn is_closed(&self) -> bool {
        self.close.is_some()
    }
}

impl<T: SyntaxNode> SyntaxNode for BracketedList<T> {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Punct(self.open));
        self.items.walk(visit);
        if let Some(close) = self.close {
            visit(Leaf::Punct(close));
        }
    }
}

impl<T: SyntaxNode> fmt::Display for BracketedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::node::write_node(self, f)
    }
}

/// A node type that can appear in a [`BracketedList`].
pub(crate) trait ListItem: Sized {
    /// Whether `c` can begin an item.
    fn starts(c: char) -> bool;

    /// A reader for one item, pushed at its first character.
    fn reader(flags: ExpressionFlags, cx: &ReadContext) -> Box<dyn Resolve>;

    /// Unwrap a finished item. `None` if `value` is some other kind.
    fn from_resolved(value: Resolved) -> Option<Self>;

    fn into_resolved(list: BracketedList<Self>) -> Resolved;
}

/// Reads a bracketed, comma-separated list of `T`.
///
/// The reader is pushed at the opening bracket. Inside the brackets line
/// endings and comments are trivia, so the list may span lines.
pub(crate) struct BracketedListReader<T> {
    open: Punct,
    close: Punct,
    flags: ExpressionFlags,
    items: SyntaxList<T>,
    opened: bool,
    closed: bool,
}

impl<T: ListItem> BracketedListReader<T> {
    /// `open` must be `(`, `[` or `{`.
    pub fn new(open: Punct, flags: ExpressionFlags) -> Self {
        Self {
            open,
            close: open.closing().unwrap_or(Punct::CloseParen),
            flags: flags | ExpressionFlags::IN_BRACKETS,
            items: SyntaxList::new(),
            opened: false,
            closed: false,
        }
    }

    fn recovery(&self) -> Terminator {
        let stop = match self.close {
            Punct::CloseBracket => ",]",
            Punct::CloseBrace => ",}",
            _ => ",)",
        };
        Terminator::chars(stop).or_space()
    }
}

impl<T: ListItem> Resolve for BracketedListReader<T> {
    fn name(&self) -> &'static str {
        "BracketedList"
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if self.closed {
            return Ok(Step::Pop);
        }
        if !self.opened {
            self.opened = true;
            return Ok(Step::Consumed);
        }
        if is_space(c) {
            self.items.push_space(c);
            return Ok(Step::Consumed);
        }
        if c == '#' {
            return Ok(Step::Push(Box::new(CommentReader::new())));
        }
        if self.close.as_str().starts_with(c) {
            self.closed = true;
            return Ok(Step::Consumed);
        }
        if c == ',' {
            self.items.push_separator(Punct::Comma);
            return Ok(Step::Consumed);
        }
        if T::starts(c) {
            return Ok(Step::Push(T::reader(self.flags, cx)));
        }
        Ok(Step::Push(Box::new(InvalidTokenReader::new(self.recovery()))))
    }

    fn handle_new_line(&mut self, ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.closed || !self.opened {
            return Ok(Step::Pop);
        }
        self.items.push_trivia(Trivia::NewLine(ending));
        Ok(Step::Consumed)
    }

    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        _cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        if self.closed || !self.opened {
            return Ok(Step::Pop);
        }
        self.items.push_trivia(Trivia::Continuation(ending));
        Ok(Step::Consumed)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match value {
            Resolved::Skipped => Ok(()),
            Resolved::Trivia(t) => {
                self.items.push_trivia(t);
                Ok(())
            }
            other => {
                let kind = other.kind_name();
                let item = T::from_resolved(other).ok_or_else(|| {
                    ParseError::invalid_state("BracketedList", "Items", kind)
                })?;
                self.items.push_item(item);
                Ok(())
            }
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(T::into_resolved(BracketedList {
            open: self.open,
            items: self.items,
            close: self.closed.then_some(self.close),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Comment, Identifier};

    #[test]
    fn spaces_merge() {
        let mut list: SyntaxList<Identifier> = SyntaxList::new();
        list.push_space(' ');
        list.push_trivia(Trivia::Space(Space::new("\t")));
        list.push_item(Identifier::new("a"));
        list.push_separator(Punct::Comma);
        list.push_trivia(Trivia::Comment(Comment::new("# c")));
        assert_eq!(list.parts().len(), 4);
        assert_eq!(list.len(), 1);
        assert_eq!(list.to_string(), " \ta,# c");
    }

    #[test]
    fn item_access() {
        let mut list: SyntaxList<Identifier> = SyntaxList::new();
        for name in ["a", "b", "c"] {
            list.push_item(Identifier::new(name));
            list.push_separator(Punct::Comma);
        }
        assert_eq!(list.first().map(Identifier::as_str), Some("a"));
        assert_eq!(list.last().map(Identifier::as_str), Some("c"));
        assert_eq!(list.get(1).map(Identifier::as_str), Some("b"));
        assert!(!list.is_empty());
    }
}
