use crate::scanner::{MetaTokenKind, Scanner};
use crate::{CharRange, Code, SyntaxErrorKind, UStr};

fn kinds(source: &str) -> Vec<MetaTokenKind> {
    let scanner = Scanner::new().unwrap();
    scanner
        .tokenize(&Code::from(source))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn scan_error(source: &str) -> (SyntaxErrorKind, usize) {
    let scanner = Scanner::new().unwrap();
    let err = scanner.tokenize(&Code::from(source)).unwrap_err();
    (err.kind, err.pointer)
}

#[test]
fn operators_and_spans() {
    let scanner = Scanner::new().unwrap();
    let tokens = scanner.tokenize(&Code::from("* + ? ~ ( ) { } | > < - / &")).unwrap();
    assert_eq!(
        tokens.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
        vec![
            MetaTokenKind::Star,
            MetaTokenKind::Plus,
            MetaTokenKind::Question,
            MetaTokenKind::Tilde,
            MetaTokenKind::OpenParen,
            MetaTokenKind::CloseParen,
            MetaTokenKind::OpenBrace,
            MetaTokenKind::CloseBrace,
            MetaTokenKind::Bar,
            MetaTokenKind::Greater,
            MetaTokenKind::Less,
            MetaTokenKind::Minus,
            MetaTokenKind::Slash,
            MetaTokenKind::Amp,
        ]
    );
    assert_eq!((tokens[0].start, tokens[0].end), (0, 1));
    assert_eq!((tokens[13].start, tokens[13].end), (26, 27));
}

#[test]
fn string_literals_resolve_escapes() {
    assert_eq!(
        kinds(r"'a\nb'"),
        vec![MetaTokenKind::SingleQuote(UStr::from_codepoints(vec![
            0x61, 0xA, 0x62
        ]))]
    );
    // unrecognized escapes keep the character itself
    assert_eq!(
        kinds(r"'\q\''"),
        vec![MetaTokenKind::SingleQuote(UStr::from_codepoints(vec![
            0x71, 0x27
        ]))]
    );
    assert_eq!(
        kinds(r#""it's""#),
        vec![MetaTokenKind::DoubleQuote(UStr::from("it's"))]
    );
}

#[test]
fn caseless_literals() {
    assert_eq!(
        kinds(r#"i"Hello""#),
        vec![MetaTokenKind::CaselessDoubleQuote(UStr::from("Hello"))]
    );
    assert_eq!(
        kinds("i'a'"),
        vec![MetaTokenKind::CaselessSingleQuote(UStr::from("a"))]
    );
    // a bare `i` is not an identifier; rule references need the hash
    assert_eq!(scan_error("i ").0, SyntaxErrorKind::UnexpectedToken);
}

#[test]
fn charset_literals() {
    match &kinds("[a-z0-9_]")[0] {
        MetaTokenKind::CharsetLiteral(set) => {
            assert_eq!(
                set.ranges(),
                &[
                    CharRange::new(0x30, 0x39),
                    CharRange::new(0x5F, 0x5F),
                    CharRange::new(0x61, 0x7A),
                ]
            );
        }
        other => panic!("expected a charset literal, got {:?}", other),
    }

    // hex bounds, escaped dash and a trailing literal dash
    match &kinds(r"[\x41-\x5A\--]")[0] {
        MetaTokenKind::CharsetLiteral(set) => {
            assert_eq!(
                set.ranges(),
                &[CharRange::new(0x2D, 0x2D), CharRange::new(0x41, 0x5A)]
            );
        }
        other => panic!("expected a charset literal, got {:?}", other),
    }
}

#[test]
fn anyset_epsilon_and_hex() {
    assert_eq!(
        kinds(r"\U \e \x41 \X10FFFF"),
        vec![
            MetaTokenKind::AnySet,
            MetaTokenKind::Epsilon,
            MetaTokenKind::Hex(0x41),
            MetaTokenKind::Hex(0x10FFFF),
        ]
    );
}

#[test]
fn count_literals() {
    assert_eq!(
        kinds("3 0xFF 18446744073709551615"),
        vec![
            MetaTokenKind::Number(3),
            MetaTokenKind::Number(255),
            MetaTokenKind::Number(u64::MAX),
        ]
    );
}

#[test]
fn whitespace_and_comments_are_skipped() {
    let tokens = kinds("'a' // a trailing comment\n  | 'b'");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1], MetaTokenKind::Bar);
}

#[test]
fn unterminated_literals() {
    assert_eq!(scan_error("'abc").0, SyntaxErrorKind::UnbalancedBracket);
    assert_eq!(scan_error("[a-z").0, SyntaxErrorKind::UnbalancedBracket);
}

#[test]
fn numeric_overflow_is_reported() {
    assert_eq!(
        scan_error("18446744073709551616").0,
        SyntaxErrorKind::NumericOverflow
    );
    assert_eq!(
        scan_error(r"\x10000000000000000").0,
        SyntaxErrorKind::NumericOverflow
    );
}

#[test]
fn hex_above_unicode_is_invalid() {
    assert_eq!(scan_error(r"\x110000").0, SyntaxErrorKind::InvalidCodepoint);
    assert_eq!(scan_error(r"[\x110000]").0, SyntaxErrorKind::InvalidCodepoint);
}

#[test]
fn unrecognized_characters_carry_their_offset() {
    let (kind, pointer) = scan_error("'a' @");
    assert_eq!(kind, SyntaxErrorKind::UnexpectedToken);
    assert_eq!(pointer, 4);
}
