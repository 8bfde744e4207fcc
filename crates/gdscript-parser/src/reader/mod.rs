//! The reading-state stack machine.
//!
//! Source text is fed one character at a time to a stack of active nodes.
//! The node on top decides what each input means:
//! - consume it into itself,
//! - push a child and offer the same input to it,
//! - change its own state and look at the input again,
//! - pop itself, hand its result to its parent and let the parent see the
//!   input.
//!
//! A node may also hand back inputs it buffered while it was undecided.
//! Those are replayed, with their original line info, before the current
//! input.
//!
//! Line endings are delivered as their own event, with `\r\n` folded into
//! one, because blocks and statements end at them. A `\` right before a
//! line ending joins the two lines; that pair arrives as a single
//! continuation event, unless the node on top keeps backslashes as text (a
//! string or a comment). The end of input is an event too: it travels down
//! the stack like any other input until the root consumes it.

mod layout;
mod pending;
mod resolved;

use std::collections::VecDeque;

use gdscript_core::{LineInfo, ParseError, Position};

pub(crate) use layout::{BlockLayout, BlockMode, Placement};
pub(crate) use pending::Pending;
pub(crate) use resolved::Resolved;

use crate::tokens::{LineEnding, is_space};

/// One event fed to the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    NewLine(LineEnding),
    /// A `\` followed by a line ending.
    Continuation(LineEnding),
    Eof,
}

/// Tunables of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSettings {
    /// How many times one input may be re-dispatched before the reader
    /// reports [`ParseError::Stalled`].
    pub max_dispatch_per_input: usize,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            max_dispatch_per_input: 10_000,
        }
    }
}

/// What a node learns about the input it is handling.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadContext {
    line: LineInfo,
}

impl ReadContext {
    pub fn new(line: LineInfo) -> Self {
        Self { line }
    }

    #[inline]
    pub fn line(&self) -> LineInfo {
        self.line
    }

    /// Only spaces and tabs precede this input on its line.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.line.at_line_start
    }

    /// Indentation of the line this input is on.
    #[inline]
    pub fn indentation(&self) -> usize {
        self.line.indentation
    }

    /// Where this input starts.
    #[inline]
    pub fn position(&self) -> Position {
        self.line.position
    }
}

/// The decision a node takes for one input.
pub(crate) enum Step {
    /// The input belongs to this node.
    Consumed,
    /// The node changed state; offer it the same input again.
    Retry,
    /// Replay the buffered inputs to this node, then the current one.
    Replay(Pending),
    /// Push a child and offer it the same input.
    Push(Box<dyn Resolve>),
    /// Push a child, replay the buffered inputs to it, then the current one.
    PushReplay(Box<dyn Resolve>, Pending),
    /// The node is done; offer the input to its parent.
    Pop,
    /// The node is done; replay the buffered inputs to its parent, then the
    /// current one.
    PopReplay(Pending),
}

/// An active node of the stack machine.
///
/// `receive` is the receiver interface: a child that popped hands its
/// result, or [`Resolved::Skipped`], to the node below it.
pub(crate) trait Resolve {
    /// Name used in traces and error reports.
    fn name(&self) -> &'static str;

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError>;

    fn handle_new_line(&mut self, ending: LineEnding, cx: &ReadContext)
    -> Result<Step, ParseError>;

    /// Called at the end of input. Every node except the root ends up
    /// popping.
    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    /// Called for a line continuation. Nodes that do not span it treat it
    /// like a line ending, which settles what they buffered and ends them;
    /// a node that keeps line endings as trivia must override this.
    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        self.handle_new_line(ending, cx)
    }

    /// Whether a `\` read now is part of this node's text rather than a
    /// possible line continuation.
    fn keeps_backslash(&self) -> bool {
        false
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        Err(ParseError::invalid_state(
            self.name(),
            "any",
            value.kind_name(),
        ))
    }

    /// Turn the finished node into the value handed to its parent.
    fn finish(self: Box<Self>) -> Result<Resolved, ParseError>;
}

/// Computes line info for each input as it is first read.
#[derive(Debug)]
struct LineTracker {
    position: Position,
    indentation: usize,
    only_spaces: bool,
}

impl LineTracker {
    fn new() -> Self {
        Self {
            position: Position::START,
            indentation: 0,
            only_spaces: true,
        }
    }

    fn next(&mut self, input: Input) -> LineInfo {
        let info = LineInfo {
            position: self.position,
            indentation: self.indentation,
            at_line_start: self.only_spaces,
        };
        match input {
            Input::Char(c) => {
                if self.only_spaces && is_space(c) {
                    self.indentation += 1;
                } else {
                    self.only_spaces = false;
                }
                self.position.column += 1;
                self.position.offset += c.len_utf8() as u32;
            }
            Input::NewLine(ending) => {
                self.position.line += 1;
                self.position.column = 1;
                self.position.offset += ending.len() as u32;
                self.indentation = 0;
                self.only_spaces = true;
            }
            // The joined line keeps the indentation of the one it continues.
            Input::Continuation(ending) => {
                self.position.line += 1;
                self.position.column = 1;
                self.position.offset += 1 + ending.len() as u32;
                self.only_spaces = false;
            }
            Input::Eof => {}
        }
        info
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Drives a stack of [`Resolve`] nodes over source text.
pub(crate) struct Reader {
    stack: Vec<Box<dyn Resolve>>,
    queue: VecDeque<(Input, LineInfo)>,
    tracker: LineTracker,
    pending_cr: bool,
    /// A `\` held back until the next character shows whether it continues
    /// the line.
    pending_backslash: bool,
    /// The line ending being read follows a `\`.
    continued: bool,
    settings: ReadSettings,
}

impl Reader {
    pub fn new(root: Box<dyn Resolve>, settings: ReadSettings) -> Self {
        Self {
            stack: vec![root],
            queue: VecDeque::new(),
            tracker: LineTracker::new(),
            pending_cr: false,
            pending_backslash: false,
            continued: false,
            settings,
        }
    }

    /// Feed a chunk of source. May be called repeatedly.
    pub fn read(&mut self, text: &str) -> Result<(), ParseError> {
        for c in text.chars() {
            if self.pending_cr {
                self.pending_cr = false;
                if c == '\n' {
                    self.enqueue_line_end(LineEnding::CrLf);
                    self.drain()?;
                    continue;
                }
                self.enqueue_line_end(LineEnding::Cr);
                self.drain()?;
            }
            if self.pending_backslash {
                self.pending_backslash = false;
                if matches!(c, '\r' | '\n') {
                    self.continued = true;
                } else {
                    self.enqueue(Input::Char('\\'));
                    self.drain()?;
                }
            }
            match c {
                '\r' => self.pending_cr = true,
                '\n' => self.enqueue_line_end(LineEnding::Lf),
                '\\' if !self.top_keeps_backslash() => self.pending_backslash = true,
                c => self.enqueue(Input::Char(c)),
            }
            self.drain()?;
        }
        Ok(())
    }

    /// Signal the end of input and return the root's result.
    pub fn finish(mut self) -> Result<Resolved, ParseError> {
        if self.pending_backslash {
            self.pending_backslash = false;
            self.enqueue(Input::Char('\\'));
        }
        if self.pending_cr {
            self.pending_cr = false;
            self.enqueue_line_end(LineEnding::Cr);
        }
        self.enqueue(Input::Eof);
        self.drain()?;

        while self.stack.len() > 1 {
            self.pop()?;
        }
        let root = self.stack.pop().ok_or(ParseError::EmptyStack {
            position: self.tracker.position(),
        })?;
        tracing::trace!(node = root.name(), "finish root");
        root.finish()
    }

    fn enqueue(&mut self, input: Input) {
        let info = self.tracker.next(input);
        self.queue.push_back((input, info));
    }

    fn top_keeps_backslash(&self) -> bool {
        self.stack.last().is_some_and(|top| top.keeps_backslash())
    }

    fn enqueue_line_end(&mut self, ending: LineEnding) {
        if std::mem::take(&mut self.continued) {
            self.enqueue(Input::Continuation(ending));
        } else {
            self.enqueue(Input::NewLine(ending));
        }
    }

    fn drain(&mut self) -> Result<(), ParseError> {
        while let Some((input, info)) = self.queue.pop_front() {
            self.dispatch(input, info)?;
        }
        Ok(())
    }

    fn top(&mut self) -> Result<&mut Box<dyn Resolve>, ParseError> {
        let position = self.tracker.position();
        self.stack
            .last_mut()
            .ok_or(ParseError::EmptyStack { position })
    }

    fn dispatch(&mut self, input: Input, info: LineInfo) -> Result<(), ParseError> {
        let cx = ReadContext::new(info);
        for _ in 0..self.settings.max_dispatch_per_input {
            let top = self.top()?;
            let step = match input {
                Input::Char(c) => top.handle_char(c, &cx)?,
                Input::NewLine(ending) => top.handle_new_line(ending, &cx)?,
                Input::Continuation(ending) => top.handle_continuation(ending, &cx)?,
                Input::Eof => top.handle_eof(&cx)?,
            };
            match step {
                Step::Consumed => return Ok(()),
                Step::Retry => {}
                Step::Replay(replay) => {
                    self.requeue(input, info, replay);
                    return Ok(());
                }
                Step::Push(child) => self.push(child),
                Step::PushReplay(child, replay) => {
                    self.push(child);
                    self.requeue(input, info, replay);
                    return Ok(());
                }
                Step::Pop => self.pop()?,
                Step::PopReplay(replay) => {
                    self.pop()?;
                    self.requeue(input, info, replay);
                    return Ok(());
                }
            }
        }
        Err(ParseError::Stalled {
            position: cx.position(),
            steps: self.settings.max_dispatch_per_input,
        })
    }

    fn requeue(&mut self, input: Input, info: LineInfo, replay: Pending) {
        self.queue.push_front((input, info));
        for item in replay.into_inputs().into_iter().rev() {
            self.queue.push_front(item);
        }
    }

    fn push(&mut self, child: Box<dyn Resolve>) {
        tracing::trace!(node = child.name(), depth = self.stack.len(), "push");
        self.stack.push(child);
    }

    fn pop(&mut self) -> Result<(), ParseError> {
        let position = self.tracker.position();
        if self.stack.len() < 2 {
            return Err(ParseError::EmptyStack { position });
        }
        let child = self.stack.pop().ok_or(ParseError::EmptyStack { position })?;
        tracing::trace!(node = child.name(), depth = self.stack.len(), "pop");
        let value = child.finish()?;
        self.top()?.receive(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscript_core::ParseErrorKind;

    /// Collects everything it sees as raw text.
    #[derive(Default)]
    struct Collector {
        text: String,
        lines: Vec<LineInfo>,
    }

    impl Resolve for Collector {
        fn name(&self) -> &'static str {
            "Collector"
        }

        fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
            self.text.push(c);
            self.lines.push(cx.line());
            Ok(Step::Consumed)
        }

        fn handle_new_line(
            &mut self,
            ending: LineEnding,
            cx: &ReadContext,
        ) -> Result<Step, ParseError> {
            self.text.push_str(ending.as_str());
            self.lines.push(cx.line());
            Ok(Step::Consumed)
        }

        fn handle_continuation(
            &mut self,
            ending: LineEnding,
            cx: &ReadContext,
        ) -> Result<Step, ParseError> {
            self.text.push_str(&crate::tokens::Trivia::Continuation(ending).to_string());
            self.lines.push(cx.line());
            Ok(Step::Consumed)
        }

        fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
            Ok(Step::Consumed)
        }

        fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
            Ok(Resolved::Trivia(crate::tokens::Trivia::Invalid(
                crate::tokens::InvalidToken::new(self.text),
            )))
        }
    }

    /// Never makes progress.
    struct Spinner;

    impl Resolve for Spinner {
        fn name(&self) -> &'static str {
            "Spinner"
        }

        fn handle_char(&mut self, _c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
            Ok(Step::Retry)
        }

        fn handle_new_line(
            &mut self,
            _ending: LineEnding,
            _cx: &ReadContext,
        ) -> Result<Step, ParseError> {
            Ok(Step::Retry)
        }

        fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
            Ok(Resolved::Skipped)
        }
    }

    fn collect(chunks: &[&str]) -> String {
        let mut reader = Reader::new(Box::new(Collector::default()), ReadSettings::default());
        for chunk in chunks {
            reader.read(chunk).unwrap();
        }
        match reader.finish().unwrap() {
            Resolved::Trivia(t) => t.to_string(),
            other => panic!("unexpected {}", other.kind_name()),
        }
    }

    #[test]
    fn line_endings_are_preserved() {
        assert_eq!(collect(&["a\r\nb\rc\n"]), "a\r\nb\rc\n");
    }

    #[test]
    fn crlf_split_across_chunks() {
        assert_eq!(collect(&["a\r", "\nb"]), "a\r\nb");
        assert_eq!(collect(&["a\r"]), "a\r");
    }

    #[test]
    fn backslashes_round_trip() {
        assert_eq!(collect(&["a \\\n\tb"]), "a \\\n\tb");
        assert_eq!(collect(&["a\\", "\r\nb\\"]), "a\\\r\nb\\");
        assert_eq!(collect(&["\\x\\\\"]), "\\x\\\\");
    }

    #[test]
    fn continuation_is_one_event() {
        let mut tracker = LineTracker::new();
        tracker.next(Input::Char('\t'));
        tracker.next(Input::Char('a'));
        tracker.next(Input::Continuation(LineEnding::Lf));
        let joined = tracker.next(Input::Char(' '));
        assert!(!joined.at_line_start);
        assert_eq!(joined.indentation, 1);
        assert_eq!(joined.position.line, 2);
        assert_eq!(joined.position.offset, 4);
    }

    #[test]
    fn line_tracker_reports_indentation() {
        let mut tracker = LineTracker::new();
        let first = tracker.next(Input::Char('\t'));
        assert!(first.at_line_start);
        assert_eq!(first.indentation, 0);

        let second = tracker.next(Input::Char('x'));
        assert!(second.at_line_start);
        assert_eq!(second.indentation, 1);

        let third = tracker.next(Input::Char('y'));
        assert!(!third.at_line_start);

        tracker.next(Input::NewLine(LineEnding::Lf));
        let next_line = tracker.next(Input::Char('z'));
        assert!(next_line.at_line_start);
        assert_eq!(next_line.position.line, 2);
        assert_eq!(next_line.position.column, 1);
    }

    #[test]
    fn stalled_reader_reports_error() {
        let settings = ReadSettings {
            max_dispatch_per_input: 16,
        };
        let mut reader = Reader::new(Box::new(Spinner), settings);
        let err = reader.read("x").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Stalled);
    }
}
