use crate::metaast::MetaAst;
use crate::parser::{find_matching_pair, scan_to_end_of_unit, MetaParser};
use crate::scanner::Scanner;
use crate::{CharRange, CharSet, Code, SyntaxErrorKind, UStr};

fn parse(source: &str) -> MetaAst {
    let parser = MetaParser::new().unwrap();
    match parser.parse(&Code::from(source)) {
        Ok(ast) => ast,
        Err(err) => panic!("failed to parse {:?}: {:?} {}", source, err.kind, err.message),
    }
}

fn parse_folded(source: &str) -> MetaAst {
    let mut ast = parse(source);
    ast.fold().unwrap();
    ast
}

fn parse_error(source: &str) -> SyntaxErrorKind {
    let parser = MetaParser::new().unwrap();
    parser.parse(&Code::from(source)).unwrap_err().kind
}

fn charset(ranges: &[(u32, u32)]) -> MetaAst {
    MetaAst::Charset(CharSet::from_ranges(
        ranges.iter().map(|(s, e)| CharRange::new(*s, *e)).collect(),
    ))
}

// Folded trees survive printing and reparsing.
fn assert_round_trip(source: &str) {
    let ast = parse_folded(source);
    let rendered = format!("{}", ast);
    let reparsed = parse_folded(&rendered);
    assert_eq!(
        reparsed, ast,
        "round trip of {:?} through {:?} diverged",
        source, rendered
    );
}

#[test]
fn alternation_of_characters_folds_to_a_charset() {
    assert_eq!(parse_folded("'a' | 'b' | 'c'"), charset(&[(0x61, 0x63)]));
}

#[test]
fn charset_difference() {
    let ast = parse_folded("[a-z] - [aeiou]");
    assert_eq!(
        ast,
        charset(&[
            (0x62, 0x64),
            (0x66, 0x68),
            (0x6A, 0x6E),
            (0x70, 0x74),
            (0x76, 0x7A),
        ])
    );
}

#[test]
fn adjacent_strings_fold() {
    assert_eq!(
        parse_folded("\"hello\" \"world\""),
        MetaAst::String(UStr::from("helloworld"))
    );
}

#[test]
fn rule_references_stay_symbolic() {
    let ast = parse_folded("#id \"x\"");
    match &ast {
        MetaAst::Cat(seq) => {
            assert_eq!(seq.len(), 2);
            assert_eq!(seq[0], MetaAst::Identifier(UStr::from("id")));
            assert_eq!(seq[1], MetaAst::String(UStr::from("x")));
        }
        other => panic!("expected a cat, got {}", other),
    }
}

#[test]
fn exact_repetition_stays_a_count_node() {
    let ast = parse_folded("('x')3");
    assert_eq!(
        ast,
        MetaAst::Count(3, Box::new(charset(&[(0x78, 0x78)])))
    );

    // the degenerate counts normalize away
    assert_eq!(parse_folded("('x')1"), charset(&[(0x78, 0x78)]));
    assert_eq!(parse_folded("('x')0"), MetaAst::Eps);

    // a bare count binds as a postfix too
    assert_eq!(
        parse_folded("'x'3"),
        MetaAst::Count(3, Box::new(charset(&[(0x78, 0x78)])))
    );
}

#[test]
fn charset_intersection() {
    assert_eq!(parse_folded("[a-z] & [p-t]"), charset(&[(0x70, 0x74)]));
}

#[test]
fn charset_complement() {
    let expected = charset(&[(0, 0x2F), (0x3A, crate::MAX_UNICODE)]);
    assert_eq!(parse_folded("~[0-9]"), expected);
    // postfix and prefix complement agree
    assert_eq!(parse_folded("[0-9]~"), expected);
}

#[test]
fn kleene_star_round_trip() {
    let ast = parse_folded("'a'*");
    assert_eq!(format!("{}", ast), "'a'*");
}

#[test]
fn atoms() {
    assert_eq!(parse("\\e"), MetaAst::Eps);
    assert_eq!(parse("''"), MetaAst::Eps);
    assert_eq!(parse("\\x41"), charset(&[(0x41, 0x41)]));
    assert_eq!(parse("\\U"), MetaAst::Charset(CharSet::universe()));
    assert_eq!(parse("#rule"), MetaAst::Identifier(UStr::from("rule")));
    // caseless single character covers both cases
    assert_eq!(parse("i'a'"), charset(&[(0x41, 0x41), (0x61, 0x61)]));
    assert_eq!(
        parse("i\"ab\""),
        MetaAst::Caseless(UStr::from("ab"))
    );
}

#[test]
fn postfix_chains_are_left_associative() {
    let ast = parse("'a'*+?");
    assert_eq!(
        ast,
        MetaAst::Optional(Box::new(MetaAst::Plus(Box::new(MetaAst::Star(
            Box::new(charset(&[(0x61, 0x61)]))
        )))))
    );
}

#[test]
fn concatenation_is_implicit() {
    let ast = parse("'a' 'b' 'c'");
    match &ast {
        MetaAst::Cat(seq) => assert_eq!(seq.len(), 3),
        other => panic!("expected a cat, got {}", other),
    }
}

#[test]
fn binary_operator_precedence() {
    // & binds tighter than |
    let ast = parse("#a & #b | #c");
    assert_eq!(
        ast,
        MetaAst::Or(
            Box::new(MetaAst::Intersect(
                Box::new(MetaAst::Identifier(UStr::from("a"))),
                Box::new(MetaAst::Identifier(UStr::from("b"))),
            )),
            Box::new(MetaAst::Identifier(UStr::from("c"))),
        )
    );

    // / binds tighter than -
    let ast = parse("#a - #b / #c");
    assert_eq!(
        ast,
        MetaAst::Reject(
            Box::new(MetaAst::Identifier(UStr::from("a"))),
            Box::new(MetaAst::NoFollow(
                Box::new(MetaAst::Identifier(UStr::from("b"))),
                Box::new(MetaAst::Identifier(UStr::from("c"))),
            )),
        )
    );

    // concatenation binds tighter than any binary operator
    let ast = parse("'a' 'b' | 'c'");
    assert!(matches!(&ast, MetaAst::Or(left, _) if matches!(**left, MetaAst::Cat(_))));
}

#[test]
fn binary_operators_are_left_associative() {
    let ast = parse("#a - #b - #c");
    assert_eq!(
        ast,
        MetaAst::Reject(
            Box::new(MetaAst::Reject(
                Box::new(MetaAst::Identifier(UStr::from("a"))),
                Box::new(MetaAst::Identifier(UStr::from("b"))),
            )),
            Box::new(MetaAst::Identifier(UStr::from("c"))),
        )
    );

    let ast = parse("#a > #b < #c");
    assert_eq!(
        ast,
        MetaAst::LessThan(
            Box::new(MetaAst::GreaterThan(
                Box::new(MetaAst::Identifier(UStr::from("a"))),
                Box::new(MetaAst::Identifier(UStr::from("b"))),
            )),
            Box::new(MetaAst::Identifier(UStr::from("c"))),
        )
    );
}

#[test]
fn groups_and_captures() {
    assert_eq!(parse("('a')"), charset(&[(0x61, 0x61)]));
    assert_eq!(
        parse("{'a'}"),
        MetaAst::Capture(Box::new(charset(&[(0x61, 0x61)])))
    );

    // a single atom comes back as itself, not a one-element sequence
    assert!(!matches!(parse("('a' 'b')"), MetaAst::Cat(seq) if seq.len() != 2));
}

#[test]
fn unit_boundaries() {
    let scanner = Scanner::new().unwrap();
    let tokens = scanner
        .tokenize(&Code::from("('a' | 'b')* #c"))
        .unwrap();
    assert_eq!(find_matching_pair(&tokens, 0).unwrap(), 4);
    assert_eq!(scan_to_end_of_unit(&tokens, 0).unwrap(), 6);
    assert_eq!(scan_to_end_of_unit(&tokens, 6).unwrap(), 7);

    let tokens = scanner.tokenize(&Code::from("{('x')3}~ 'y'")).unwrap();
    assert_eq!(find_matching_pair(&tokens, 0).unwrap(), 5);
    assert_eq!(scan_to_end_of_unit(&tokens, 0).unwrap(), 7);
}

#[test]
fn unbalanced_brackets() {
    assert_eq!(parse_error("('a'"), SyntaxErrorKind::UnbalancedBracket);
    assert_eq!(parse_error("{'a' ('b'}"), SyntaxErrorKind::UnbalancedBracket);
}

#[test]
fn empty_groups() {
    assert_eq!(parse_error("()"), SyntaxErrorKind::EmptyGroup);
    assert_eq!(parse_error("{}"), SyntaxErrorKind::EmptyGroup);
}

#[test]
fn trailing_operators() {
    assert_eq!(parse_error("'a' |"), SyntaxErrorKind::TrailingOperator);
    assert_eq!(parse_error("'a' -"), SyntaxErrorKind::TrailingOperator);
    assert_eq!(parse_error("~"), SyntaxErrorKind::TrailingOperator);
    assert_eq!(parse_error("('a' &)"), SyntaxErrorKind::TrailingOperator);
}

#[test]
fn unexpected_tokens() {
    assert_eq!(parse_error(""), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(parse_error(")"), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(parse_error("'a' | | 'b'"), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(parse_error("'a' )"), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(parse_error("3"), SyntaxErrorKind::UnexpectedToken);
}

#[test]
fn errors_carry_the_offending_offset() {
    let parser = MetaParser::new().unwrap();
    let err = parser.parse(&Code::from("'a' )")).unwrap_err();
    assert_eq!(err.pointer, 4);
}

#[test]
fn folded_trees_round_trip() {
    for source in [
        "'a' | 'b' | 'c'",
        "[a-z] - [aeiou]",
        "\"hello\" \"world\"",
        "#id \"x\"",
        "('x')3",
        "[a-z] & [p-t]",
        "~[0-9]",
        "'a'*",
        "{#a | #b}+ 'x'",
        "#a - #b / #c",
        "#head (#tail)? \\e | \"end\"",
        "i\"select\" [ \\t]+ #column",
    ] {
        assert_round_trip(source);
    }
}
