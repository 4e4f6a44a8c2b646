use crate::{FoldError, SyntaxError, SyntaxErrorKind};
use std::fmt::{Display, Formatter};

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, pointer: usize, message: String) -> Self {
        Self {
            kind,
            pointer,
            message,
        }
    }

    pub fn is_unexpected_token(&self) -> bool {
        self.kind == SyntaxErrorKind::UnexpectedToken
    }

    pub fn is_unbalanced(&self) -> bool {
        self.kind == SyntaxErrorKind::UnbalancedBracket
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SyntaxError: {}", self.message)
    }
}

impl Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyntaxErrorKind::UnexpectedToken => "unexpected token",
            SyntaxErrorKind::UnbalancedBracket => "unbalanced bracket",
            SyntaxErrorKind::EmptyGroup => "empty group",
            SyntaxErrorKind::TrailingOperator => "trailing operator",
            SyntaxErrorKind::NumericOverflow => "numeric overflow",
            SyntaxErrorKind::InvalidCodepoint => "invalid codepoint",
        };
        f.write_str(name)
    }
}

impl Display for FoldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FoldError::SetOpOnNonSet(op) => {
                writeln!(f, "FoldError: set operator '{}' applied to a non-set operand", op)
            }
        }
    }
}
