//! Indentation-delimited blocks of statements, members, cases or accessors.

use gdscript_core::ParseError;

use crate::form::{Form, FormState};
use crate::list::SyntaxList;
use crate::reader::{
    BlockLayout, BlockMode, Pending, Placement, ReadContext, Resolve, Resolved, Step,
};
use crate::tokens::{CommentReader, InvalidTokenReader, LineEnding, Punct, Terminator, Trivia, is_space};

/// A node type that fills the lines of a block.
pub(crate) trait BlockItem: Sized {
    const NAME: &'static str;

    /// Separates items sharing a line.
    const SEPARATOR: Punct;

    /// Whether `c` can begin an item.
    fn starts(c: char) -> bool;

    /// A reader for one item, pushed at its first character.
    fn reader(cx: &ReadContext) -> Box<dyn Resolve>;

    /// Unwrap a finished item. `None` if `value` is some other kind.
    fn from_resolved(value: Resolved) -> Option<Self>;

    fn into_resolved(list: SyntaxList<Self>) -> Resolved;

    /// Whether another item may follow this one on the same line without a
    /// separator, as after `@export`.
    fn shares_line(&self) -> bool {
        false
    }
}

/// Handle one character of a header after its last clause, while it waits
/// for the `:` that opens its block. The colon moves `form` to `body`.
pub(crate) fn header_colon<S: FormState>(
    form: &mut Form<S>,
    c: char,
    body: S,
) -> Result<Step, ParseError> {
    if is_space(c) {
        form.add_space(c);
        return Ok(Step::Consumed);
    }
    match c {
        ':' => {
            form.set_state(body)?;
            Ok(Step::Consumed)
        }
        '#' => Ok(Step::Pop),
        _ => Ok(Step::Push(Box::new(InvalidTokenReader::new(
            Terminator::chars(":"),
        )))),
    }
}

/// Reads the items of one block.
///
/// Indentation at the start of a line is held back until the line's first
/// character shows whether the line still belongs to this block. If it
/// does not, the indentation is handed back with that character.
pub(crate) struct BlockReader<T> {
    layout: BlockLayout,
    items: SyntaxList<T>,
    line_start: Pending,
    expect_item: bool,
    root: bool,
}

impl<T: BlockItem> BlockReader<T> {
    /// The top-level block of a file.
    pub fn root() -> Self {
        Self {
            layout: BlockLayout::root(),
            items: SyntaxList::new(),
            line_start: Pending::new(),
            expect_item: true,
            root: true,
        }
    }

    /// A block after the colon of a header indented by `owner`.
    pub fn nested(owner: usize) -> Self {
        Self {
            layout: BlockLayout::nested(owner),
            items: SyntaxList::new(),
            line_start: Pending::new(),
            expect_item: true,
            root: false,
        }
    }

    fn flush_line_start(&mut self) {
        let pending = self.line_start.take();
        self.items.extend_trivia(pending.into_trivia());
    }

    fn start_item(&mut self, c: char, cx: &ReadContext) -> Step {
        self.expect_item = false;
        if T::starts(c) {
            Step::Push(T::reader(cx))
        } else {
            Step::Push(Box::new(InvalidTokenReader::new(Terminator::chars(
                T::SEPARATOR.as_str(),
            ))))
        }
    }

    /// Handle a character on a line that already has content.
    fn handle_in_line(&mut self, c: char, cx: &ReadContext) -> Step {
        if is_space(c) {
            self.items.push_space(c);
            return Step::Consumed;
        }
        if c == '#' {
            return Step::Push(Box::new(CommentReader::new()));
        }
        if T::SEPARATOR.as_str().starts_with(c) {
            self.items.push_separator(T::SEPARATOR);
            self.expect_item = true;
            return Step::Consumed;
        }
        if self.expect_item && T::starts(c) {
            return self.start_item(c, cx);
        }
        if self.layout.mode() == BlockMode::Inline || matches!(c, ')' | ']' | '}' | ',') {
            // Something the enclosing node must deal with.
            if !self.root {
                return Step::Pop;
            }
        }
        self.start_item(c, cx)
    }
}

impl<T: BlockItem> Resolve for BlockReader<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        match self.layout.mode() {
            BlockMode::Undecided => {
                if is_space(c) {
                    self.items.push_space(c);
                    return Ok(Step::Consumed);
                }
                if c == '#' {
                    return Ok(Step::Push(Box::new(CommentReader::new())));
                }
                self.layout.set_mode(BlockMode::Inline);
                Ok(self.handle_in_line(c, cx))
            }
            BlockMode::Inline => Ok(self.handle_in_line(c, cx)),
            BlockMode::Block if cx.at_line_start() => {
                if is_space(c) {
                    self.line_start.push_char(c, cx);
                    return Ok(Step::Consumed);
                }
                if c == '#' {
                    self.flush_line_start();
                    return Ok(Step::Push(Box::new(CommentReader::new())));
                }
                match self.layout.place(cx.indentation()) {
                    Placement::Item => {
                        self.flush_line_start();
                        Ok(self.start_item(c, cx))
                    }
                    Placement::End => Ok(Step::PopReplay(self.line_start.take())),
                }
            }
            BlockMode::Block => Ok(self.handle_in_line(c, cx)),
        }
    }

    fn handle_new_line(&mut self, ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.layout.mode() {
            BlockMode::Inline => Ok(Step::Pop),
            BlockMode::Undecided | BlockMode::Block => {
                self.layout.set_mode(BlockMode::Block);
                self.flush_line_start();
                self.items.push_trivia(Trivia::NewLine(ending));
                self.expect_item = true;
                Ok(Step::Consumed)
            }
        }
    }

    /// A joined line continues whatever item it is in.
    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        _cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        self.flush_line_start();
        self.items.push_trivia(Trivia::Continuation(ending));
        Ok(Step::Consumed)
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.root {
            self.flush_line_start();
            return Ok(Step::Consumed);
        }
        Ok(Step::PopReplay(self.line_start.take()))
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
                let item = T::from_resolved(other)
                    .ok_or_else(|| ParseError::invalid_state(T::NAME, "Items", kind))?;
                self.expect_item = item.shares_line();
                self.items.push_item(item);
                Ok(())
            }
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let mut this = *self;
        this.flush_line_start();
        Ok(T::into_resolved(this.items))
    }
}
