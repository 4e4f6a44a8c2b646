//! Metagram is a meta-grammar front-end library to parse a user-supplied meta-syntax describing
//! a grammar and normalize it into a production [AST](metaast::MetaAst) which can be lowered to
//! context-free-grammar productions for an RNGLR parse table generator.
//!
//! # Overview
//! A parser generator reads the grammar of the target language written in a meta-syntax.
//! Each right-hand side of a grammar rule is an expression over literals, character sets,
//! rule references and the usual regular operators like alternation, repetition and
//! concatenation, together with disambiguation operators like longest-match (`>`),
//! reject (`-`) and no-follow (`/`).
//! This library covers the front half of such a generator:
//! a [Scanner](scanner::Scanner) splits the meta-syntax source into typed tokens,
//! a precedence-climbing [MetaParser](parser::MetaParser) builds the
//! [MetaAst](metaast::MetaAst) for one right-hand side, and a constant
//! [folder](metaast::MetaAst::fold) rewrites the tree into a canonical form where
//! character-set algebra and literal concatenation have been evaluated.
//! The folded tree is the input for the downstream CFG lowering, which registers symbols
//! in its symbol table and emits [Reduction] records for the parse table.
//!
//! # Design
//!
//! The meta-AST is a single owning sum type rather than a hierarchy of production objects.
//! Every child is an exclusively owned subtree, so folding can replace a child in place and
//! teardown is the ordinary recursive drop.
//! The parser is written as precedence climbing with a minimum binding power instead of an
//! ordered table of candidate rules; the unit boundary helpers
//! [scan_to_end_of_unit](parser::scan_to_end_of_unit) and
//! [find_matching_pair](parser::find_matching_pair) split the token run the same way the
//! candidate-rule formulation would.
//! Character sets are kept as sorted, non-overlapping ranges of code points so that the
//! folder can evaluate union, difference, intersection and complement directly.
//!
//! # Example
//!
//! Parsing and folding a small right-hand side:
//!
//! ```
//! use metagram::metaast::MetaAst;
//! use metagram::parser::MetaParser;
//! use metagram::Code;
//!
//! let parser = MetaParser::new().unwrap();
//!
//! // A character-set expression folds down to a single set.
//! let mut vowelless = parser.parse(&Code::from("[a-z] - [aeiou]")).unwrap();
//! vowelless.fold().unwrap();
//! assert_eq!(format!("{}", vowelless), "[b-df-hj-np-tv-z]");
//!
//! // A sequence of plain string literals folds into one string.
//! let mut greeting = parser.parse(&Code::from("\"hello\" \"world\"")).unwrap();
//! greeting.fold().unwrap();
//! assert_eq!(greeting, MetaAst::String("helloworld".into()));
//! ```

mod charset;
mod code;
mod error;
mod logger;
pub mod metaast;
pub mod parser;
mod position;
mod reduction;
pub mod scanner;
pub mod ustring;

use once_cell::unsync::OnceCell;

/// The largest Unicode scalar value a charset range may cover.
pub const MAX_UNICODE: u32 = 0x10FFFF;

/// The first code point above the Unicode range.
/// The downstream grammar uses it as the end-of-start-rule sentinel of the augmented grammar;
/// it never appears in user text.
pub const AUGMENT_CHAR: u32 = 0x200000;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
/// A code-point string: a finite sequence of 21-bit Unicode scalar values.
///
/// Unlike [String], a [UStr] may also hold the reserved [AUGMENT_CHAR] sentinel,
/// which is not a valid [char].
pub struct UStr(Vec<u32>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A closed range of code points. Both bounds are inclusive.
pub struct CharRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, PartialEq, Eq, Hash, Default)]
/// A set of code points stored as sorted, non-overlapping [CharRange]s.
pub struct CharSet {
    ranges: Vec<CharRange>,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a byte offset of the source.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A wrapper for the meta-syntax source to be scanned, with lazy line information
/// for diagnostics.
pub struct Code<'c> {
    pub value: &'c [u8],
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the scanner and the parser.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The category of a [SyntaxError].
pub enum SyntaxErrorKind {
    /// No rule claimed the current token prefix.
    UnexpectedToken,
    /// `(`, `{`, `[` or a quote without a matching closer.
    UnbalancedBracket,
    /// `()` or `{}` with no expression inside.
    EmptyGroup,
    /// A binary operator with no right-hand operand.
    TrailingOperator,
    /// A count literal does not fit in `u64`.
    NumericOverflow,
    /// A hex literal above [MAX_UNICODE].
    InvalidCodepoint,
}

#[derive(Debug, Clone)]
/// An error returned when the scanner or the parser rejects the meta-syntax source.
///
/// `pointer` is the byte offset of the offending token; scanning and parsing stop
/// at the first error.
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub pointer: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An error raised by the constant folder.
pub enum FoldError {
    /// A set operator remained whose operands could not be reduced to charsets.
    /// The payload is the operator symbol.
    SetOpOnNonSet(&'static str),
}

/// The symbol-table collaborator owned by the downstream lowering.
///
/// Reduction records reference non-terminals by index; rendering a reduction
/// resolves the index to a name through this trait.
pub trait SymbolLookup {
    fn get_symbol(&self, idx: u64) -> Option<&UStr>;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
/// An RNGLR reduction marker for the parse table: reduce `length` symbols from the
/// parse stack under the non-terminal at `head_idx` of the symbol table.
pub struct Reduction {
    head_idx: u64,
    length: u64,
}
