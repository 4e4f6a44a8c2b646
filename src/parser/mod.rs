//! A precedence-climbing parser from a [MetaToken] stream to a [MetaAst].
//!
//! The grammar of the meta-syntax itself, from tightest to loosest binding:
//! postfix operators (`*`, `+`, `?`, `~`, `(A)k`), implicit concatenation,
//! intersection `&`, no-follow `/`, subtraction `-`, the longest/shortest
//! disambiguations `>` and `<`, and alternation `|`.
//! Instead of an ordered table of candidate rules, one recursive function
//! climbs with a minimum binding power; the unit boundary primitives
//! [scan_to_end_of_unit] and [find_matching_pair] split the token run into
//! the units that concatenation and the binary operators compose.
//!
//! Parsing stops eagerly at the first invalid token and reports a
//! [SyntaxError] carrying the byte span of the offender.
//!
//! # Example
//! ```
//! use metagram::parser::MetaParser;
//! use metagram::Code;
//!
//! let parser = MetaParser::new().unwrap();
//! let ast = parser.parse(&Code::from("{'a' | 'b'}+ #tail")).unwrap();
//! assert_eq!(format!("{}", ast), "{'a' | 'b'}+ #tail");
//! ```

use crate::metaast::MetaAst;
use crate::scanner::{MetaToken, MetaTokenKind, Scanner};
use crate::{CharRange, CharSet, Code, Log, SyntaxError, SyntaxErrorKind, UStr};
use once_cell::unsync::OnceCell;

#[cfg(test)]
mod __tests__;

/// The meta-syntax parser: a [Scanner] plus the token-level grammar.
pub struct MetaParser {
    scanner: Scanner,
    log: OnceCell<Log<&'static str>>,
}

impl MetaParser {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            scanner: Scanner::new()?,
            log: OnceCell::new(),
        })
    }

    /// Set a log label to debug the parser result.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Scan and parse one right-hand side of a grammar rule.
    pub fn parse(&self, code: &Code) -> Result<MetaAst, SyntaxError> {
        let result = self
            .scanner
            .tokenize(code)
            .and_then(|tokens| Self::parse_tokens(&tokens));

        #[cfg(debug_assertions)]
        if let Some(log) = self.log.get() {
            match &result {
                Ok(ast) => {
                    if log.order() >= Log::Success(()).order() {
                        println!("[{}; ParseSuccess]: {} nodes", log, ast.node_count());
                    }
                }
                Err(err) => {
                    if log.order() >= Log::Result(()).order() {
                        println!(
                            "[{}; ParseError]: {} at {}",
                            log,
                            err.kind,
                            code.position_of(err.pointer)
                        );
                    }
                }
            }
        }

        result
    }

    /// Parse an already scanned token stream.
    pub fn parse_tokens(tokens: &[MetaToken]) -> Result<MetaAst, SyntaxError> {
        if tokens.is_empty() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                0,
                "Expression expected.".to_string(),
            ));
        }
        parse_range(tokens)
    }
}

/// Return the index of the closing bracket matching the opener at
/// `open_index`, accounting for nesting of the same bracket kind.
pub fn find_matching_pair(tokens: &[MetaToken], open_index: usize) -> Result<usize, SyntaxError> {
    let (open, close) = match tokens[open_index].kind {
        MetaTokenKind::OpenParen => (MetaTokenKind::OpenParen, MetaTokenKind::CloseParen),
        MetaTokenKind::OpenBrace => (MetaTokenKind::OpenBrace, MetaTokenKind::CloseBrace),
        _ => {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                tokens[open_index].start,
                "Bracket expected.".to_string(),
            ))
        }
    };
    let mut depth: usize = 0;
    for (offset, token) in tokens[open_index..].iter().enumerate() {
        if token.kind == open {
            depth += 1;
        } else if token.kind == close {
            depth -= 1;
            if depth == 0 {
                return Ok(open_index + offset);
            }
        }
    }
    Err(SyntaxError::new(
        SyntaxErrorKind::UnbalancedBracket,
        tokens[open_index].start,
        "Bracket has no matching closer.".to_string(),
    ))
}

/// Return the exclusive end of the unit starting at `start`: optional prefix
/// complements, one atom (skipping balanced bracket groups) and the postfix
/// tail. This boundary is the granularity on which concatenation and the
/// binary operators compose.
pub fn scan_to_end_of_unit(tokens: &[MetaToken], start: usize) -> Result<usize, SyntaxError> {
    let mut index = start;
    while index < tokens.len() && matches!(tokens[index].kind, MetaTokenKind::Tilde) {
        index += 1;
    }
    if index >= tokens.len() {
        let pointer = tokens.last().map_or(0, |t| t.end);
        return Err(SyntaxError::new(
            SyntaxErrorKind::TrailingOperator,
            pointer,
            "Expression expected after operator.".to_string(),
        ));
    }
    match &tokens[index].kind {
        MetaTokenKind::OpenParen | MetaTokenKind::OpenBrace => {
            index = find_matching_pair(tokens, index)? + 1;
        }
        kind if kind.is_atom_start() => index += 1,
        _ => {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                tokens[index].start,
                "Expression unit expected.".to_string(),
            ))
        }
    }
    while index < tokens.len() {
        match &tokens[index].kind {
            MetaTokenKind::Star
            | MetaTokenKind::Plus
            | MetaTokenKind::Question
            | MetaTokenKind::Tilde
            | MetaTokenKind::Number(_) => index += 1,
            MetaTokenKind::OpenParen => {
                // `(NUM)` is an exact-repetition postfix; any other group
                // starts the next unit of a concatenation
                let is_count = matches!(
                    (tokens.get(index + 1), tokens.get(index + 2)),
                    (
                        Some(MetaToken {
                            kind: MetaTokenKind::Number(_),
                            ..
                        }),
                        Some(MetaToken {
                            kind: MetaTokenKind::CloseParen,
                            ..
                        })
                    )
                );
                if is_count {
                    index += 3;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    Ok(index)
}

// expr := sequence (binary-op expr)*, climbing while the operator binds at
// least as tightly as `min_bp`. Left associativity comes from climbing the
// right side with `bp + 1`.
fn parse_expr(
    tokens: &[MetaToken],
    index: usize,
    min_bp: u8,
) -> Result<(MetaAst, usize), SyntaxError> {
    let (mut lhs, mut index) = parse_sequence(tokens, index)?;
    while index < tokens.len() {
        let bp = match binding_power(&tokens[index].kind) {
            Some(bp) if bp >= min_bp => bp,
            _ => break,
        };
        let op = tokens[index].kind.clone();
        index += 1;
        let (rhs, next) = parse_expr(tokens, index, bp + 1)?;
        index = next;
        lhs = match op {
            MetaTokenKind::Amp => MetaAst::Intersect(Box::new(lhs), Box::new(rhs)),
            MetaTokenKind::Slash => MetaAst::NoFollow(Box::new(lhs), Box::new(rhs)),
            MetaTokenKind::Minus => MetaAst::Reject(Box::new(lhs), Box::new(rhs)),
            MetaTokenKind::Greater => MetaAst::GreaterThan(Box::new(lhs), Box::new(rhs)),
            MetaTokenKind::Less => MetaAst::LessThan(Box::new(lhs), Box::new(rhs)),
            _ => MetaAst::Or(Box::new(lhs), Box::new(rhs)),
        };
    }
    Ok((lhs, index))
}

fn binding_power(kind: &MetaTokenKind) -> Option<u8> {
    match kind {
        MetaTokenKind::Amp => Some(5),
        MetaTokenKind::Slash => Some(4),
        MetaTokenKind::Minus => Some(3),
        MetaTokenKind::Greater | MetaTokenKind::Less => Some(2),
        MetaTokenKind::Bar => Some(1),
        _ => None,
    }
}

// One or more units; juxtaposition is concatenation.
fn parse_sequence(tokens: &[MetaToken], index: usize) -> Result<(MetaAst, usize), SyntaxError> {
    if index >= tokens.len() {
        let pointer = tokens.last().map_or(0, |t| t.end);
        return Err(SyntaxError::new(
            SyntaxErrorKind::TrailingOperator,
            pointer,
            "Expression expected after operator.".to_string(),
        ));
    }
    if !tokens[index].kind.is_atom_start() {
        return Err(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken,
            tokens[index].start,
            "Expression unit expected.".to_string(),
        ));
    }
    let mut units: Vec<MetaAst> = Vec::new();
    let mut i = index;
    while i < tokens.len() && tokens[i].kind.is_atom_start() {
        let end = scan_to_end_of_unit(tokens, i)?;
        units.push(parse_unit(&tokens[i..end])?);
        i = end;
    }
    if units.len() == 1 {
        Ok((units.remove(0), i))
    } else {
        Ok((MetaAst::Cat(units), i))
    }
}

// Parse exactly one unit: prefix complements, an atom and its postfix chain.
// The slice is the extent reported by `scan_to_end_of_unit`.
fn parse_unit(tokens: &[MetaToken]) -> Result<MetaAst, SyntaxError> {
    let mut prefix = 0;
    while prefix < tokens.len() && matches!(tokens[prefix].kind, MetaTokenKind::Tilde) {
        prefix += 1;
    }
    let (mut node, mut index) = parse_atom(tokens, prefix)?;
    while index < tokens.len() {
        match &tokens[index].kind {
            MetaTokenKind::Star => {
                node = MetaAst::Star(Box::new(node));
                index += 1;
            }
            MetaTokenKind::Plus => {
                node = MetaAst::Plus(Box::new(node));
                index += 1;
            }
            MetaTokenKind::Question => {
                node = MetaAst::Optional(Box::new(node));
                index += 1;
            }
            MetaTokenKind::Tilde => {
                node = MetaAst::Compliment(Box::new(node));
                index += 1;
            }
            MetaTokenKind::Number(count) => {
                node = MetaAst::Count(*count, Box::new(node));
                index += 1;
            }
            MetaTokenKind::OpenParen => match tokens.get(index + 1) {
                Some(MetaToken {
                    kind: MetaTokenKind::Number(count),
                    ..
                }) => {
                    node = MetaAst::Count(*count, Box::new(node));
                    index += 3;
                }
                _ => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken,
                        tokens[index].start,
                        "Repetition count expected.".to_string(),
                    ))
                }
            },
            _ => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnexpectedToken,
                    tokens[index].start,
                    "Postfix operator expected.".to_string(),
                ))
            }
        }
    }
    for _ in 0..prefix {
        node = MetaAst::Compliment(Box::new(node));
    }
    Ok(node)
}

fn parse_atom(tokens: &[MetaToken], index: usize) -> Result<(MetaAst, usize), SyntaxError> {
    let token = match tokens.get(index) {
        Some(token) => token,
        None => {
            let pointer = tokens.last().map_or(0, |t| t.end);
            return Err(SyntaxError::new(
                SyntaxErrorKind::TrailingOperator,
                pointer,
                "Expression expected after operator.".to_string(),
            ));
        }
    };
    match &token.kind {
        MetaTokenKind::Epsilon => Ok((MetaAst::Eps, index + 1)),
        MetaTokenKind::Identifier(name) => Ok((MetaAst::Identifier(name.clone()), index + 1)),
        MetaTokenKind::SingleQuote(s) => Ok((literal_node(s, false, true), index + 1)),
        MetaTokenKind::DoubleQuote(s) => Ok((literal_node(s, false, false), index + 1)),
        MetaTokenKind::CaselessSingleQuote(s) => Ok((literal_node(s, true, true), index + 1)),
        MetaTokenKind::CaselessDoubleQuote(s) => Ok((literal_node(s, true, false), index + 1)),
        MetaTokenKind::CharsetLiteral(set) => Ok((MetaAst::Charset(set.clone()), index + 1)),
        MetaTokenKind::AnySet => Ok((MetaAst::Charset(CharSet::universe()), index + 1)),
        MetaTokenKind::Hex(value) => Ok((MetaAst::Charset(CharSet::point(*value)), index + 1)),
        MetaTokenKind::OpenParen | MetaTokenKind::OpenBrace => {
            let close = find_matching_pair(tokens, index)?;
            if close == index + 1 {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::EmptyGroup,
                    token.start,
                    "Group has no expression inside.".to_string(),
                ));
            }
            let inner = parse_range(&tokens[index + 1..close])?;
            let node = if matches!(token.kind, MetaTokenKind::OpenBrace) {
                MetaAst::Capture(Box::new(inner))
            } else {
                inner
            };
            Ok((node, close + 1))
        }
        _ => Err(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken,
            token.start,
            "Expression unit expected.".to_string(),
        )),
    }
}

// Parse a token range which must be consumed completely.
fn parse_range(tokens: &[MetaToken]) -> Result<MetaAst, SyntaxError> {
    let (node, consumed) = parse_expr(tokens, 0, 0)?;
    if consumed < tokens.len() {
        return Err(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken,
            tokens[consumed].start,
            "Operator or end of expression expected.".to_string(),
        ));
    }
    Ok(node)
}

// A quoted literal: the empty literal is epsilon; a single-quoted single
// character becomes a one-point charset so it stays composable with the set
// operators; everything else is a string match.
fn literal_node(s: &UStr, caseless: bool, composable: bool) -> MetaAst {
    if s.is_empty() {
        return MetaAst::Eps;
    }
    if composable && s.len() == 1 {
        let c = s.codepoints()[0];
        let mut set = CharSet::point(c);
        if caseless {
            if let Some(ch) = char::from_u32(c) {
                for low in ch.to_lowercase() {
                    set.add_range(CharRange::point(low as u32));
                }
                for up in ch.to_uppercase() {
                    set.add_range(CharRange::point(up as u32));
                }
            }
        }
        return MetaAst::Charset(set);
    }
    if caseless {
        MetaAst::Caseless(s.clone())
    } else {
        MetaAst::String(s.clone())
    }
}
