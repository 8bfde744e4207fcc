//! Class members and the declarations behind them.

mod attribute;
mod class;
mod enums;
mod method;
mod signal;
mod variable;

use gdscript_core::ParseError;

pub use attribute::{
    AttributeDeclaration, AttributeState, ClassNameAttribute, ClassNameState, ExtendsAttribute,
    ExtendsState,
};
pub use class::{ClassDeclaration, ClassMembers, InnerClassDeclaration, InnerClassState};
pub use enums::{EnumDeclaration, EnumState, EnumValue, EnumValueState};
pub use method::{MethodDeclaration, MethodState, Parameter, ParameterState};
pub use signal::{SignalDeclaration, SignalState};
pub use variable::{Accessor, AccessorState, VariableDeclaration, VariableState};

pub(crate) use attribute::AttributeReader;
pub(crate) use method::MethodReader;
pub(crate) use variable::VariableReader;

use crate::block::BlockItem;
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{Pending, ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    InvalidTokenReader, Keyword, LineEnding, Punct, Terminator, Trivia, is_ident_continue,
    is_ident_start, is_space,
};

/// One entry of a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Variable(VariableDeclaration),
    Method(MethodDeclaration),
    Signal(SignalDeclaration),
    Enum(EnumDeclaration),
    InnerClass(InnerClassDeclaration),
    ClassName(ClassNameAttribute),
    Extends(ExtendsAttribute),
    /// The `tool` keyword of older scripts.
    Tool,
    /// `pass` in an otherwise empty class body.
    Pass,
    Attribute(AttributeDeclaration),
}

impl ClassMember {
    pub fn as_variable(&self) -> Option<&VariableDeclaration> {
        match self {
            ClassMember::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDeclaration> {
        match self {
            ClassMember::Method(m) => Some(m),
            _ => None,
        }
    }
}

impl SyntaxNode for ClassMember {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        match self {
            ClassMember::Variable(m) => m.walk(visit),
            ClassMember::Method(m) => m.walk(visit),
            ClassMember::Signal(m) => m.walk(visit),
            ClassMember::Enum(m) => m.walk(visit),
            ClassMember::InnerClass(m) => m.walk(visit),
            ClassMember::ClassName(m) => m.walk(visit),
            ClassMember::Extends(m) => m.walk(visit),
            ClassMember::Tool => visit(Leaf::Keyword(Keyword::Tool)),
            ClassMember::Pass => visit(Leaf::Keyword(Keyword::Pass)),
            ClassMember::Attribute(m) => m.walk(visit),
        }
    }
}

impl BlockItem for ClassMember {
    const NAME: &'static str = "Members";
    const SEPARATOR: Punct = Punct::Semicolon;

    fn starts(c: char) -> bool {
        c == '@' || is_ident_start(c)
    }

    fn reader(_cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(MemberResolver::new())
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::Member(m) => Some(m),
            _ => None,
        }
    }

    fn into_resolved(list: SyntaxList<Self>) -> Resolved {
        Resolved::Members(list)
    }

    fn shares_line(&self) -> bool {
        matches!(self, ClassMember::Attribute(_) | ClassMember::ClassName(_))
    }
}

/// Decides which declaration starts here.
///
/// Declarations share no prefix longer than a word, except `static` which
/// may lead `var` and `func`. The leading words are buffered and replayed
/// into the reader they select.
struct MemberResolver {
    pending: Pending,
    /// Offset of the word being read in `pending`.
    word_start: Option<usize>,
    after_static: bool,
    result: Option<ClassMember>,
    trivia: Option<Trivia>,
}

impl MemberResolver {
    fn new() -> Self {
        Self {
            pending: Pending::new(),
            word_start: None,
            after_static: false,
            result: None,
            trivia: None,
        }
    }

    fn quarantine(&mut self) -> Step {
        self.word_start = None;
        Step::PushReplay(
            Box::new(InvalidTokenReader::new(Terminator::chars(";"))),
            self.pending.take(),
        )
    }

    fn dispatch(&mut self, start: usize) -> Step {
        self.word_start = None;
        let word = self.pending.text_from(start);
        if self.after_static && !matches!(word.as_str(), "var" | "func") {
            return self.quarantine();
        }
        let indent = self
            .pending
            .first_line()
            .map(|line| line.indentation)
            .unwrap_or_default();
        let reader: Box<dyn Resolve> = match word.as_str() {
            "static" => {
                self.after_static = true;
                return Step::Retry;
            }
            "var" | "const" => Box::new(VariableReader::member(indent)),
            "func" => Box::new(MethodReader::member(indent)),
            "signal" => Box::new(signal::SignalReader::new()),
            "enum" => Box::new(enums::EnumReader::new()),
            "class" => Box::new(class::InnerClassReader::new(indent)),
            "class_name" => Box::new(attribute::ClassNameReader::new()),
            "extends" => Box::new(attribute::ExtendsReader::new()),
            "tool" | "pass" => {
                self.pending.take();
                self.result = Some(if word == "tool" {
                    ClassMember::Tool
                } else {
                    ClassMember::Pass
                });
                return Step::Pop;
            }
            _ => return self.quarantine(),
        };
        Step::PushReplay(reader, self.pending.take())
    }
}

impl Resolve for MemberResolver {
    fn name(&self) -> &'static str {
        "ClassMember"
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if self.result.is_some() || self.trivia.is_some() {
            return Ok(Step::Pop);
        }
        if let Some(start) = self.word_start {
            if is_ident_continue(c) {
                self.pending.push_char(c, cx);
                return Ok(Step::Consumed);
            }
            return Ok(self.dispatch(start));
        }
        if c == '@' && self.pending.is_empty() {
            return Ok(Step::Push(Box::new(AttributeReader::new())));
        }
        if is_ident_start(c) {
            self.word_start = Some(self.pending.len());
            self.pending.push_char(c, cx);
            return Ok(Step::Consumed);
        }
        if is_space(c) && self.after_static {
            self.pending.push_char(c, cx);
            return Ok(Step::Consumed);
        }
        if self.pending.is_empty() {
            return Ok(Step::Pop);
        }
        Ok(self.quarantine())
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.result.is_some() || self.trivia.is_some() {
            return Ok(Step::Pop);
        }
        if let Some(start) = self.word_start {
            return Ok(self.dispatch(start));
        }
        if self.pending.is_empty() {
            return Ok(Step::Pop);
        }
        Ok(self.quarantine())
    }

    fn handle_eof(&mut self, cx: &ReadContext) -> Result<Step, ParseError> {
        self.handle_new_line(LineEnding::Lf, cx)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match value {
            Resolved::Skipped => {}
            Resolved::Member(m) => self.result = Some(m),
            Resolved::Trivia(t) => self.trivia = Some(t),
            other => {
                return Err(ParseError::invalid_state(
                    "ClassMember",
                    "Dispatch",
                    other.kind_name(),
                ));
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(match (self.result, self.trivia) {
            (Some(member), _) => Resolved::Member(member),
            (None, Some(trivia)) => Resolved::Trivia(trivia),
            (None, None) => Resolved::Skipped,
        })
    }
}

impl_display!(ClassMember);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn members_on_one_line() {
        let source = "var a = 1; var b = 2";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert_eq!(class.variables().count(), 2);
    }

    #[test]
    fn static_members() {
        let source = "static var count = 0\nstatic  func make():\n\treturn null\n";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert!(class.variables().next().unwrap().is_static());
        assert!(class.methods().next().unwrap().is_static());
    }

    #[test]
    fn unknown_words_are_quarantined() {
        let source = "var a = 1\nbogus thing here\nfunc f():\n\tpass\n";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        let invalid = class.invalid_tokens();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].as_str(), "bogus thing here");
        assert_eq!(class.variables().count(), 1);
        assert_eq!(class.methods().count(), 1);
    }

    #[test]
    fn static_before_other_words_is_quarantined() {
        let source = "static signal s\nvar x";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert!(class.has_invalid_tokens());
        assert_eq!(class.signals().count(), 0);
        assert_eq!(class.variables().count(), 1);
    }
}
