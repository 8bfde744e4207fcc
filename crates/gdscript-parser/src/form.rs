//! The Form: positional token slots plus the parse state of a node.
//!
//! Every composite node keeps its semantic tokens in named fields, one per
//! grammar slot, and a [`Form`] next to them. The form knows which slot the
//! node is currently filling (its state) and stores the trivia that arrived
//! in front of each slot. Trivia always goes in front of the *active* slot,
//! whatever its logical position, so the physical order of the source is
//! kept while the grammar fills slots in logical order.

use std::fmt;

use gdscript_core::ParseError;

use crate::node::{Leaf, SyntaxNode};
use crate::tokens::{Space, Trivia};

/// The state enum of a node's form.
///
/// Variants are declared in slot order and each one names the slot being
/// filled while the node is in that state. The last variant is always
/// `Completed`; trivia recorded there trails the node.
pub trait FormState: Copy + Ord + fmt::Debug + Into<u8> {
    /// The node name used in invalid-state reports.
    const NODE: &'static str;
    /// The state a freshly created node starts in.
    const FIRST: Self;
    /// The terminal state.
    const COMPLETED: Self;

    /// The slot index of this state.
    fn index(self) -> u8 {
        self.into()
    }
}

/// Implement [`FormState`] for a `#[repr(u8)]` state enum.
macro_rules! impl_form_state {
    ($state:ty, $node:literal, $first:ident) => {
        impl $crate::form::FormState for $state {
            const NODE: &'static str = $node;
            const FIRST: Self = <$state>::$first;
            const COMPLETED: Self = <$state>::Completed;
        }
    };
}

pub(crate) use impl_form_state;

/// Slot-ordered trivia and the current parse state of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Form<S> {
    state: S,
    trivia: Vec<(u8, Trivia)>,
}

impl<S: FormState> Default for Form<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FormState> Form<S> {
    /// Create a form in its first state with no trivia.
    pub fn new() -> Self {
        Self {
            state: S::FIRST,
            trivia: Vec::new(),
        }
    }

    /// The current state.
    #[inline]
    pub fn state(&self) -> S {
        self.state
    }

    /// Whether the node reached its terminal state.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.state == S::COMPLETED
    }

    /// Whether the current state is `state` or an earlier one.
    #[inline]
    pub fn is_or_lower(&self, state: S) -> bool {
        self.state <= state
    }

    /// Advance to `state`, skipping every slot in between.
    ///
    /// States never move backwards.
    pub fn set_state(&mut self, state: S) -> Result<(), ParseError> {
        if state < self.state {
            return Err(ParseError::StateRegression {
                node: S::NODE,
                from: format!("{:?}", self.state),
                to: format!("{:?}", state),
            });
        }
        self.state = state;
        Ok(())
    }

    /// Mark the node completed.
    pub fn complete(&mut self) {
        self.state = S::COMPLETED;
    }

    /// Fail unless the node is at most at `state`.
    ///
    /// Receivers call this before storing a token into the slot of `state`.
    pub fn ensure(&self, state: S, received: &'static str) -> Result<(), ParseError> {
        if self.is_or_lower(state) {
            Ok(())
        } else {
            Err(ParseError::invalid_state(S::NODE, self.state, received))
        }
    }

    /// Build the invalid-state error for the current state.
    pub fn invalid(&self, received: &'static str) -> ParseError {
        ParseError::invalid_state(S::NODE, self.state, received)
    }

    /// Splice trivia in front of whichever slot is being filled.
    pub fn add_before_active_token(&mut self, trivia: Trivia) {
        let index = self.state.index();
        if let Trivia::Space(space) = &trivia {
            if let Some((last, Trivia::Space(prev))) = self.trivia.last_mut() {
                if *last == index {
                    prev.push_str(space.as_str());
                    return;
                }
            }
        }
        self.trivia.push((index, trivia));
    }

    /// Add a single space or tab in front of the active slot.
    pub fn add_space(&mut self, c: char) {
        let index = self.state.index();
        if let Some((last, Trivia::Space(prev))) = self.trivia.last_mut() {
            if *last == index {
                prev.push(c);
                return;
            }
        }
        self.trivia.push((index, Trivia::Space(Space::from_char(c))));
    }

    /// Add several trivia in order.
    pub fn extend_trivia(&mut self, trivia: impl IntoIterator<Item = Trivia>) {
        for t in trivia {
            self.add_before_active_token(t);
        }
    }

    /// Start an ordered walk over the slots of this form.
    pub(crate) fn walker<'a, 'v>(
        &'a self,
        visit: &'v mut dyn FnMut(Leaf<'a>),
    ) -> FormWalker<'a, 'v, S> {
        FormWalker {
            form: self,
            next: 0,
            visit,
        }
    }
}

/// Interleaves a form's trivia with its slots while walking a node.
pub(crate) struct FormWalker<'a, 'v, S> {
    form: &'a Form<S>,
    next: usize,
    visit: &'v mut dyn FnMut(Leaf<'a>),
}

impl<'a, S: FormState> FormWalker<'a, '_, S> {
    fn flush_through(&mut self, index: u8) {
        while let Some((i, trivia)) = self.form.trivia.get(self.next) {
            if *i > index {
                break;
            }
            (self.visit)(Leaf::Trivia(trivia));
            self.next += 1;
        }
    }

    /// Emit the trivia in front of `state`, then the slot itself.
    pub fn slot(&mut self, state: S, node: &'a dyn SyntaxNode) -> &mut Self {
        self.flush_through(state.index());
        node.walk(&mut *self.visit);
        self
    }

    /// Emit a single leaf held in the slot of `state`.
    pub fn leaf(&mut self, state: S, leaf: Option<Leaf<'a>>) -> &mut Self {
        self.flush_through(state.index());
        if let Some(leaf) = leaf {
            (self.visit)(leaf);
        }
        self
    }

    /// Emit the remaining trivia.
    pub fn finish(&mut self) {
        self.flush_through(S::COMPLETED.index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Comment, LineEnding};
    use num_enum::IntoPrimitive;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
    #[repr(u8)]
    enum TestState {
        First,
        Second,
        Completed,
    }

    impl_form_state!(TestState, "Test", First);

    #[test]
    fn starts_in_first_state() {
        let form = Form::<TestState>::new();
        assert_eq!(form.state(), TestState::First);
        assert!(!form.is_completed());
        assert!(form.is_or_lower(TestState::Second));
    }

    #[test]
    fn state_never_regresses() {
        let mut form = Form::<TestState>::new();
        form.set_state(TestState::Second).unwrap();
        let err = form.set_state(TestState::First).unwrap_err();
        assert_eq!(err.kind(), gdscript_core::ParseErrorKind::StateRegression);
        assert_eq!(form.state(), TestState::Second);
    }

    #[test]
    fn ensure_rejects_later_states() {
        let mut form = Form::<TestState>::new();
        assert!(form.ensure(TestState::First, "token").is_ok());
        form.complete();
        assert!(form.ensure(TestState::Second, "token").is_err());
    }

    #[test]
    fn trivia_goes_before_active_slot() {
        let mut form = Form::<TestState>::new();
        form.add_space(' ');
        form.add_space('\t');
        form.set_state(TestState::Second).unwrap();
        form.add_before_active_token(Trivia::Comment(Comment::new("# hi")));
        form.complete();
        form.add_before_active_token(Trivia::NewLine(LineEnding::Lf));

        let slots: Vec<u8> = form.trivia.iter().map(|(i, _)| *i).collect();
        assert_eq!(slots, vec![0, 1, 2]);
        match &form.trivia[0].1 {
            Trivia::Space(space) => assert_eq!(space.as_str(), " \t"),
            other => panic!("expected merged space, got {:?}", other),
        }
    }
}
