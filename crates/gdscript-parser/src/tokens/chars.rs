//! Character classes shared by the token readers.

/// Check if a character can start an identifier.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Check if a character can continue an identifier.
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Spaces and tabs. Line endings are delivered separately by the reader.
#[inline]
pub fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Characters that may appear in an operator symbol.
#[inline]
pub fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '<' | '>' | '=' | '!' | '&' | '|' | '^' | '~'
    )
}

/// Characters allowed in an unquoted `$Path/To/Node` path.
#[inline]
pub fn is_node_path_char(c: char) -> bool {
    c == '/' || is_ident_continue(c)
}
