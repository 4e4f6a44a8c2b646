//! A module to split meta-syntax source text into typed [MetaToken]s.
//!
//! The scanner walks the input left to right and recognizes one lexeme at each
//! position: literal tokens through anchored regular expressions, operators
//! through a single byte match.
//! Literal payloads are decoded eagerly, so a token already carries the
//! resolved escapes of a string, the [CharSet] of a `[…]` literal, the checked
//! value of a count, or the code point of a `\xHH` hex literal.
//! Whitespace and `//` line comments are skipped.
//!
//! # Example
//! ```
//! use metagram::scanner::{MetaTokenKind, Scanner};
//! use metagram::Code;
//!
//! let scanner = Scanner::new().unwrap();
//! let tokens = scanner.tokenize(&Code::from("#digit | [0-9]")).unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].kind, MetaTokenKind::Bar);
//! ```

use crate::ustring::{escape_to_unicode, parse_dec, parse_hex};
use crate::{CharRange, CharSet, Code, Log, SyntaxError, SyntaxErrorKind, UStr, MAX_UNICODE};
use once_cell::unsync::OnceCell;
use regex::bytes::Regex;

#[cfg(test)]
mod __tests__;

#[derive(Debug, Clone, PartialEq, Eq)]
/// The kind of a meta-syntax token. Literal kinds carry their decoded payload.
pub enum MetaTokenKind {
    /// The empty-string literal `\e`.
    Epsilon,
    /// A rule reference `#name`; the payload omits the hash.
    Identifier(UStr),
    /// A `'…'` literal with escapes resolved; a single character composes
    /// with the set operators.
    SingleQuote(UStr),
    /// A `"…"` literal with escapes resolved; always a string match.
    DoubleQuote(UStr),
    /// An `i'…'` case-insensitive literal.
    CaselessSingleQuote(UStr),
    /// An `i"…"` case-insensitive literal.
    CaselessDoubleQuote(UStr),
    /// A `[…]` character-set literal.
    CharsetLiteral(CharSet),
    /// The any-set `\U`.
    AnySet,
    /// A `\xHH` code-point literal.
    Hex(u32),
    /// A repetition count.
    Number(u64),
    Star,
    Plus,
    Question,
    Tilde,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Bar,
    Greater,
    Less,
    Minus,
    Slash,
    Amp,
}

impl MetaTokenKind {
    /// Whether a token of this kind can begin a unit expression.
    pub fn is_atom_start(&self) -> bool {
        match self {
            MetaTokenKind::Epsilon
            | MetaTokenKind::Identifier(_)
            | MetaTokenKind::SingleQuote(_)
            | MetaTokenKind::DoubleQuote(_)
            | MetaTokenKind::CaselessSingleQuote(_)
            | MetaTokenKind::CaselessDoubleQuote(_)
            | MetaTokenKind::CharsetLiteral(_)
            | MetaTokenKind::AnySet
            | MetaTokenKind::Hex(_)
            | MetaTokenKind::Tilde
            | MetaTokenKind::OpenParen
            | MetaTokenKind::OpenBrace => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Element of the scanned token stream with its byte span in the source.
pub struct MetaToken {
    pub kind: MetaTokenKind,
    pub start: usize,
    pub end: usize,
}

impl MetaToken {
    pub fn new(kind: MetaTokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// The meta-syntax tokenizer.
///
/// All lexeme patterns are compiled once at construction; [tokenize](Scanner::tokenize)
/// can then be called for any number of inputs.
pub struct Scanner {
    string_lexeme: Regex,
    charset_lexeme: Regex,
    identifier_lexeme: Regex,
    hex_lexeme: Regex,
    number_lexeme: Regex,
    skip_lexeme: Regex,
    log: OnceCell<Log<&'static str>>,
}

impl Scanner {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            string_lexeme: compile(r#"^(?s)i?('([^'\\]|\\.)*'|"([^"\\]|\\.)*")"#)?,
            charset_lexeme: compile(r"^(?s)\[([^\]\\]|\\.)*\]")?,
            identifier_lexeme: compile(r"^#[_a-zA-Z][_a-zA-Z0-9]*")?,
            hex_lexeme: compile(r"^\\[xX][0-9a-fA-F]+")?,
            number_lexeme: compile(r"^(0[xX][0-9a-fA-F]+|[0-9]+)")?,
            skip_lexeme: compile(r"^(\s+|//[^\n]*)+")?,
            log: OnceCell::new(),
        })
    }

    /// Set a log label to debug the scanner result.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Split the source into a token stream, or fail at the first unrecognized lexeme.
    pub fn tokenize(&self, code: &Code) -> Result<Vec<MetaToken>, SyntaxError> {
        let result = self.run(code);

        #[cfg(debug_assertions)]
        if let Some(log) = self.log.get() {
            match &result {
                Ok(tokens) => {
                    if log.order() >= Log::Success(()).order() {
                        println!("[{}; ScanSuccess]: {} tokens", log, tokens.len());
                    }
                }
                Err(err) => {
                    if log.order() >= Log::Result(()).order() {
                        println!(
                            "[{}; ScanError]: {} at {}",
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

    fn run(&self, code: &Code) -> Result<Vec<MetaToken>, SyntaxError> {
        let mut tokens: Vec<MetaToken> = Vec::new();
        let mut pointer: usize = 0;
        while pointer < code.value.len() {
            if let Some(m) = self.skip_lexeme.find(&code.value[pointer..]) {
                pointer += m.end();
                continue;
            }
            let token = match code.value[pointer] {
                b'*' => self.operator(MetaTokenKind::Star, pointer),
                b'+' => self.operator(MetaTokenKind::Plus, pointer),
                b'?' => self.operator(MetaTokenKind::Question, pointer),
                b'~' => self.operator(MetaTokenKind::Tilde, pointer),
                b'(' => self.operator(MetaTokenKind::OpenParen, pointer),
                b')' => self.operator(MetaTokenKind::CloseParen, pointer),
                b'{' => self.operator(MetaTokenKind::OpenBrace, pointer),
                b'}' => self.operator(MetaTokenKind::CloseBrace, pointer),
                b'|' => self.operator(MetaTokenKind::Bar, pointer),
                b'>' => self.operator(MetaTokenKind::Greater, pointer),
                b'<' => self.operator(MetaTokenKind::Less, pointer),
                b'-' => self.operator(MetaTokenKind::Minus, pointer),
                b'/' => self.operator(MetaTokenKind::Slash, pointer),
                b'&' => self.operator(MetaTokenKind::Amp, pointer),
                b'\\' => self.scan_backslash(code, pointer)?,
                b'\'' | b'"' | b'i' => self.scan_string(code, pointer)?,
                b'[' => self.scan_charset(code, pointer)?,
                b'#' => self.scan_identifier(code, pointer)?,
                b'0'..=b'9' => self.scan_number(code, pointer)?,
                _ => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken,
                        pointer,
                        format!("Unrecognized character at {}.", code.position_of(pointer)),
                    ))
                }
            };
            pointer = token.end;
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn operator(&self, kind: MetaTokenKind, pointer: usize) -> MetaToken {
        MetaToken::new(kind, pointer, pointer + 1)
    }

    fn scan_backslash(&self, code: &Code, pointer: usize) -> Result<MetaToken, SyntaxError> {
        if let Some(m) = self.hex_lexeme.find(&code.value[pointer..]) {
            let digits = lexeme_text(code, pointer + 2, pointer + m.end());
            let value = parse_hex(digits).ok_or_else(|| {
                SyntaxError::new(
                    SyntaxErrorKind::NumericOverflow,
                    pointer,
                    format!("Hex literal '\\{}' does not fit in u64.", digits),
                )
            })?;
            if value > MAX_UNICODE as u64 {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::InvalidCodepoint,
                    pointer,
                    format!("Hex literal \\x{:X} is above the Unicode range.", value),
                ));
            }
            return Ok(MetaToken::new(
                MetaTokenKind::Hex(value as u32),
                pointer,
                pointer + m.end(),
            ));
        }
        match code.value.get(pointer + 1) {
            Some(b'U') => Ok(MetaToken::new(MetaTokenKind::AnySet, pointer, pointer + 2)),
            Some(b'e') => Ok(MetaToken::new(MetaTokenKind::Epsilon, pointer, pointer + 2)),
            _ => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                pointer,
                format!("Unrecognized escape at {}.", code.position_of(pointer)),
            )),
        }
    }

    fn scan_string(&self, code: &Code, pointer: usize) -> Result<MetaToken, SyntaxError> {
        let m = match self.string_lexeme.find(&code.value[pointer..]) {
            Some(m) => m,
            None => {
                return if code.value[pointer] == b'i' {
                    Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken,
                        pointer,
                        format!("Unrecognized character at {}.", code.position_of(pointer)),
                    ))
                } else {
                    Err(SyntaxError::new(
                        SyntaxErrorKind::UnbalancedBracket,
                        pointer,
                        format!(
                            "Unterminated string literal at {}.",
                            code.position_of(pointer)
                        ),
                    ))
                };
            }
        };
        let end = pointer + m.end();
        let caseless = code.value[pointer] == b'i';
        let inner_start = if caseless { pointer + 2 } else { pointer + 1 };
        let single = code.value[inner_start - 1] == b'\'';
        let inner = lexeme_text(code, inner_start, end - 1);

        let mut payload = UStr::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    payload.push(escape_to_unicode(escaped));
                }
            } else {
                payload.push(c as u32);
            }
        }

        let kind = match (caseless, single) {
            (false, true) => MetaTokenKind::SingleQuote(payload),
            (false, false) => MetaTokenKind::DoubleQuote(payload),
            (true, true) => MetaTokenKind::CaselessSingleQuote(payload),
            (true, false) => MetaTokenKind::CaselessDoubleQuote(payload),
        };
        Ok(MetaToken::new(kind, pointer, end))
    }

    fn scan_charset(&self, code: &Code, pointer: usize) -> Result<MetaToken, SyntaxError> {
        let m = self.charset_lexeme.find(&code.value[pointer..]).ok_or_else(|| {
            SyntaxError::new(
                SyntaxErrorKind::UnbalancedBracket,
                pointer,
                format!(
                    "Character set is missing its closing ']' at {}.",
                    code.position_of(pointer)
                ),
            )
        })?;
        let end = pointer + m.end();
        let inner = lexeme_text(code, pointer + 1, end - 1);
        let set = decode_charset(inner, pointer)?;
        Ok(MetaToken::new(
            MetaTokenKind::CharsetLiteral(set),
            pointer,
            end,
        ))
    }

    fn scan_identifier(&self, code: &Code, pointer: usize) -> Result<MetaToken, SyntaxError> {
        let m = self
            .identifier_lexeme
            .find(&code.value[pointer..])
            .ok_or_else(|| {
                SyntaxError::new(
                    SyntaxErrorKind::UnexpectedToken,
                    pointer,
                    format!("Rule reference expected at {}.", code.position_of(pointer)),
                )
            })?;
        let end = pointer + m.end();
        let name = UStr::from(lexeme_text(code, pointer + 1, end));
        Ok(MetaToken::new(MetaTokenKind::Identifier(name), pointer, end))
    }

    fn scan_number(&self, code: &Code, pointer: usize) -> Result<MetaToken, SyntaxError> {
        let m = self
            .number_lexeme
            .find(&code.value[pointer..])
            .ok_or_else(|| {
                SyntaxError::new(
                    SyntaxErrorKind::UnexpectedToken,
                    pointer,
                    format!("Count literal expected at {}.", code.position_of(pointer)),
                )
            })?;
        let end = pointer + m.end();
        let text = lexeme_text(code, pointer, end);
        let value = if text.starts_with("0x") || text.starts_with("0X") {
            parse_hex(&text[2..])
        } else {
            parse_dec(text)
        };
        let value = value.ok_or_else(|| {
            SyntaxError::new(
                SyntaxErrorKind::NumericOverflow,
                pointer,
                format!("Count literal '{}' does not fit in u64.", text),
            )
        })?;
        Ok(MetaToken::new(MetaTokenKind::Number(value), pointer, end))
    }
}

// Lexeme spans always begin and end at ASCII bytes, so the slice stays on
// character boundaries of the UTF-8 source.
fn lexeme_text<'c>(code: &Code<'c>, start: usize, end: usize) -> &'c str {
    unsafe { std::str::from_utf8_unchecked(&code.value[start..end]) }
}

fn compile(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|err| format!("Lexeme pattern failed to compile.{:?}", err))
}

#[derive(Clone, Copy)]
enum SetItem {
    Point(u32),
    Dash,
}

// Inner text of a `[…]` literal: single points, `a-z` ranges, backslash
// escapes and `\xHH` bounds. A dash that is not between two points is a
// literal member.
fn decode_charset(inner: &str, pointer: usize) -> Result<CharSet, SyntaxError> {
    let mut items: Vec<SetItem> = Vec::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '-' => items.push(SetItem::Dash),
            '\\' => {
                let escaped = match chars.next() {
                    Some(e) => e,
                    None => break,
                };
                let is_hex = (escaped == 'x' || escaped == 'X')
                    && chars.peek().map_or(false, |d| d.is_ascii_hexdigit());
                if is_hex {
                    let mut digits = String::new();
                    while let Some(d) = chars.peek() {
                        if d.is_ascii_hexdigit() {
                            digits.push(*d);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let value = parse_hex(&digits).ok_or_else(|| {
                        SyntaxError::new(
                            SyntaxErrorKind::NumericOverflow,
                            pointer,
                            format!("Hex literal '\\x{}' does not fit in u64.", digits),
                        )
                    })?;
                    if value > MAX_UNICODE as u64 {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::InvalidCodepoint,
                            pointer,
                            format!("Hex literal \\x{:X} is above the Unicode range.", value),
                        ));
                    }
                    items.push(SetItem::Point(value as u32));
                } else {
                    items.push(SetItem::Point(escape_to_unicode(escaped)));
                }
            }
            _ => items.push(SetItem::Point(c as u32)),
        }
    }

    let mut set = CharSet::new();
    let mut index = 0;
    while index < items.len() {
        match items[index] {
            SetItem::Point(start) => {
                if let (Some(SetItem::Dash), Some(SetItem::Point(end))) =
                    (items.get(index + 1), items.get(index + 2))
                {
                    set.add_range(CharRange::new(start, *end));
                    index += 3;
                } else {
                    set.add_range(CharRange::point(start));
                    index += 1;
                }
            }
            SetItem::Dash => {
                set.add_range(CharRange::point('-' as u32));
                index += 1;
            }
        }
    }
    Ok(set)
}
