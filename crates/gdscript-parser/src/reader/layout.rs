//! Indentation rules shared by every block.
//!
//! A block is opened by a header line ending in `:`. If something other
//! than a comment follows the colon on the same line, the block is inline
//! and ends with that line. Otherwise its first item decides the block's
//! depth, which must be deeper than the header's. Comment-only and blank
//! lines never end a block.

/// How a block lays out its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockMode {
    /// Nothing but spaces and comments seen after the colon.
    Undecided,
    /// Items follow the colon on the header line.
    Inline,
    /// Items sit on their own, indented lines.
    Block,
}

/// Where a line whose first character was just seen belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// The line starts a new item of this block.
    Item,
    /// The line is dedented; the block is over.
    End,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockLayout {
    owner: Option<usize>,
    indent: Option<usize>,
    mode: BlockMode,
}

impl BlockLayout {
    /// The top-level block of a file. It never ends.
    pub fn root() -> Self {
        Self {
            owner: None,
            indent: None,
            mode: BlockMode::Block,
        }
    }

    /// A block opened by a header at indentation `owner`.
    pub fn nested(owner: usize) -> Self {
        Self {
            owner: Some(owner),
            indent: None,
            mode: BlockMode::Undecided,
        }
    }

    #[inline]
    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BlockMode) {
        self.mode = mode;
    }

    /// Decide where a line indented by `indentation` belongs.
    ///
    /// The first item fixes the block's depth. Deeper lines still start
    /// items; shallower ones end the block.
    pub fn place(&mut self, indentation: usize) -> Placement {
        let Some(owner) = self.owner else {
            self.indent.get_or_insert(indentation);
            return Placement::Item;
        };
        match self.indent {
            None if indentation > owner => {
                self.indent = Some(indentation);
                Placement::Item
            }
            None => Placement::End,
            Some(indent) if indentation >= indent => Placement::Item,
            Some(_) => Placement::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_never_ends() {
        let mut layout = BlockLayout::root();
        assert_eq!(layout.place(0), Placement::Item);
        assert_eq!(layout.place(4), Placement::Item);
        assert_eq!(layout.place(0), Placement::Item);
        assert_eq!(layout.mode(), BlockMode::Block);
    }

    #[test]
    fn first_item_fixes_depth() {
        let mut layout = BlockLayout::nested(0);
        assert_eq!(layout.place(4), Placement::Item);
        assert_eq!(layout.indent, Some(4));
        assert_eq!(layout.place(4), Placement::Item);
        assert_eq!(layout.place(8), Placement::Item);
        assert_eq!(layout.place(2), Placement::End);
        assert_eq!(layout.place(0), Placement::End);
    }

    #[test]
    fn empty_block_ends_on_first_dedent() {
        let mut layout = BlockLayout::nested(4);
        assert_eq!(layout.place(4), Placement::End);
        assert_eq!(layout.indent, None);
    }
}
