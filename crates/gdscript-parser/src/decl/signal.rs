use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::ClassMember;
use super::method::Parameter;
use crate::expr::ExpressionFlags;
use crate::form::{Form, impl_form_state};
use crate::list::{BracketedList, BracketedListReader};
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Identifier, IdentifierReader, Keyword, KeywordReader, LineEnding, Punct, is_ident_start,
    is_space,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum SignalState {
    Signal,
    Name,
    Parameters,
    Completed,
}

impl_form_state!(SignalState, "SignalDeclaration", Signal);

/// `signal name` or `signal name(params)`
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDeclaration {
    pub(crate) form: Form<SignalState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) parameters: Option<BracketedList<Parameter>>,
}

impl SignalDeclaration {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().flat_map(BracketedList::items)
    }
}

impl SyntaxNode for SignalDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(SignalState::Signal, Some(Leaf::Keyword(Keyword::Signal)))
            .slot(SignalState::Name, &self.name)
            .slot(SignalState::Parameters, &self.parameters)
            .finish();
    }
}

pub(crate) struct SignalReader {
    signal: SignalDeclaration,
}

impl SignalReader {
    pub fn new() -> Self {
        Self {
            signal: SignalDeclaration {
                form: Form::new(),
                name: None,
                parameters: None,
            },
        }
    }

    fn form(&mut self) -> &mut Form<SignalState> {
        &mut self.signal.form
    }
}

impl Resolve for SignalReader {
    fn name(&self) -> &'static str {
        "SignalDeclaration"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.signal.form.state();
        if is_space(c) && state > SignalState::Signal && state < SignalState::Completed {
            self.form().add_space(c);
            return Ok(Step::Consumed);
        }
        match (state, c) {
            (SignalState::Signal, _) => {
                Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Signal))))
            }
            (SignalState::Name, c) if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (SignalState::Name | SignalState::Parameters, '(') => Ok(Step::Push(Box::new(
                BracketedListReader::<Parameter>::new(Punct::OpenParen, ExpressionFlags::empty()),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.signal.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (SignalState::Signal, Resolved::Keyword(Keyword::Signal)) => {
                self.form().set_state(SignalState::Name)
            }
            (SignalState::Name, Resolved::Identifier(name)) => {
                self.signal.name = Some(name);
                self.form().set_state(SignalState::Parameters)
            }
            (_, Resolved::Parameters(list)) => {
                self.signal.form.ensure(SignalState::Parameters, "Parameters")?;
                self.signal.parameters = Some(list);
                self.form().complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.form().add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.signal.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Member(ClassMember::Signal(self.signal)))
    }
}

impl_display!(SignalDeclaration);

#[cfg(test)]
mod tests {
    use crate::decl::ClassMembers;
    use crate::parser::Parser;

    #[test]
    fn with_and_without_parameters() {
        let source = "signal died\nsignal hit(damage: int, source)\n";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        let signals: Vec<_> = class.signals().collect();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].name().unwrap().as_str(), "died");
        assert_eq!(signals[0].parameters().count(), 0);
        let params: Vec<_> = signals[1].parameters().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].type_node().unwrap().to_string(), "int");
    }
}
