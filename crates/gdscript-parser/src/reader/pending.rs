use gdscript_core::LineInfo;

use super::{Input, ReadContext};
use crate::tokens::{Comment, InvalidToken, LineEnding, Space, Trivia, is_space};

/// Inputs a node read while it could not yet decide what they mean.
///
/// A node that needs to look past a word or a run of spaces buffers the
/// raw inputs here. Once it knows, it either turns them into trivia or hands
/// them back to the reader to be replayed, each with the line info it had
/// when first read.
#[derive(Debug, Clone, Default)]
pub(crate) struct Pending {
    inputs: Vec<(Input, LineInfo)>,
}

impl Pending {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_char(&mut self, c: char, cx: &ReadContext) {
        self.inputs.push((Input::Char(c), cx.line()));
    }

    pub fn push_new_line(&mut self, ending: LineEnding, cx: &ReadContext) {
        self.inputs.push((Input::NewLine(ending), cx.line()));
    }

    pub fn push_continuation(&mut self, ending: LineEnding, cx: &ReadContext) {
        self.inputs.push((Input::Continuation(ending), cx.line()));
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Split off the inputs from `at` onwards.
    pub fn split_off(&mut self, at: usize) -> Pending {
        Pending {
            inputs: self.inputs.split_off(at.min(self.inputs.len())),
        }
    }

    /// Take every buffered input, leaving the buffer empty.
    pub fn take(&mut self) -> Pending {
        std::mem::take(self)
    }

    /// The buffered text from `from` onwards.
    pub fn text_from(&self, from: usize) -> String {
        let mut text = String::new();
        for (input, _) in self.inputs.iter().skip(from) {
            match input {
                Input::Char(c) => text.push(*c),
                Input::NewLine(ending) => text.push_str(ending.as_str()),
                Input::Continuation(ending) => {
                    text.push('\\');
                    text.push_str(ending.as_str());
                }
                Input::Eof => {}
            }
        }
        text
    }

    pub fn text(&self) -> String {
        self.text_from(0)
    }

    /// Line info of the first buffered input.
    pub fn first_line(&self) -> Option<LineInfo> {
        self.inputs.first().map(|(_, line)| *line)
    }

    /// Turn the buffer into trivia.
    ///
    /// Spaces, line endings and `#` comments keep their meaning. Anything
    /// else becomes an invalid span ending at the next space or line end.
    pub fn into_trivia(self) -> Vec<Trivia> {
        let mut out: Vec<Trivia> = Vec::new();
        let mut comment: Option<String> = None;
        let mut invalid: Option<String> = None;

        for (input, _) in self.inputs {
            let c = match input {
                Input::Char(c) => c,
                Input::NewLine(ending) => {
                    flush(&mut out, &mut comment, &mut invalid);
                    out.push(Trivia::NewLine(ending));
                    continue;
                }
                Input::Continuation(ending) => {
                    flush(&mut out, &mut comment, &mut invalid);
                    out.push(Trivia::Continuation(ending));
                    continue;
                }
                Input::Eof => continue,
            };
            if let Some(text) = comment.as_mut() {
                text.push(c);
            } else if c == '#' {
                flush(&mut out, &mut comment, &mut invalid);
                comment = Some(String::from('#'));
            } else if is_space(c) {
                flush(&mut out, &mut comment, &mut invalid);
                match out.last_mut() {
                    Some(Trivia::Space(space)) => space.push(c),
                    _ => out.push(Trivia::Space(Space::from_char(c))),
                }
            } else {
                invalid.get_or_insert_with(String::new).push(c);
            }
        }
        flush(&mut out, &mut comment, &mut invalid);
        out
    }

    pub fn into_inputs(self) -> Vec<(Input, LineInfo)> {
        self.inputs
    }
}

fn flush(out: &mut Vec<Trivia>, comment: &mut Option<String>, invalid: &mut Option<String>) {
    if let Some(text) = comment.take() {
        out.push(Trivia::Comment(Comment::new(text)));
    }
    if let Some(text) = invalid.take() {
        out.push(Trivia::Invalid(InvalidToken::new(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> Pending {
        let cx = ReadContext::new(LineInfo::START);
        let mut pending = Pending::new();
        for c in text.chars() {
            if c == '\n' {
                pending.push_new_line(LineEnding::Lf, &cx);
            } else {
                pending.push_char(c, &cx);
            }
        }
        pending
    }

    #[test]
    fn text_round_trips() {
        let pending = buffer("  not\nin");
        assert_eq!(pending.text(), "  not\nin");
        assert_eq!(pending.text_from(2), "not\nin");
        assert_eq!(pending.len(), 8);
    }

    #[test]
    fn split_keeps_order() {
        let mut pending = buffer("ab cd");
        let tail = pending.split_off(3);
        assert_eq!(pending.text(), "ab ");
        assert_eq!(tail.text(), "cd");
    }

    #[test]
    fn into_trivia_classifies_runs() {
        let trivia = buffer(" \t# note\n  ?? ").into_trivia();
        let rendered: Vec<String> = trivia.iter().map(|t| t.to_string()).collect();
        assert_eq!(rendered, vec![" \t", "# note", "\n", "  ", "??", " "]);
        assert!(matches!(trivia[4], Trivia::Invalid(_)));
        assert!(matches!(trivia[1], Trivia::Comment(_)));
    }

    #[test]
    fn continuation_stays_one_trivia() {
        let cx = ReadContext::new(LineInfo::START);
        let mut pending = buffer(" ");
        pending.push_continuation(LineEnding::CrLf, &cx);
        pending.push_char('\t', &cx);
        assert_eq!(pending.text(), " \\\r\n\t");

        let trivia = pending.into_trivia();
        assert_eq!(trivia.len(), 3);
        assert_eq!(trivia[1], Trivia::Continuation(LineEnding::CrLf));
        assert!(!trivia[1].is_new_line());
    }
}
