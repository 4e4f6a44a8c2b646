use crate::metaast::MetaAst;
use crate::{CharRange, CharSet, FoldError, UStr};

fn charset(ranges: &[(u32, u32)]) -> MetaAst {
    MetaAst::Charset(CharSet::from_ranges(
        ranges.iter().map(|(s, e)| CharRange::new(*s, *e)).collect(),
    ))
}

fn point(c: char) -> MetaAst {
    MetaAst::Charset(CharSet::point(c as u32))
}

fn string(s: &str) -> MetaAst {
    MetaAst::String(UStr::from(s))
}

fn identifier(name: &str) -> MetaAst {
    MetaAst::Identifier(UStr::from(name))
}

fn or(left: MetaAst, right: MetaAst) -> MetaAst {
    MetaAst::Or(Box::new(left), Box::new(right))
}

fn folded(mut ast: MetaAst) -> MetaAst {
    ast.fold().unwrap();
    ast
}

// The canonical-form invariants every successfully folded tree holds.
fn assert_canonical(ast: &MetaAst) {
    match ast {
        MetaAst::Intersect(_, _) | MetaAst::Compliment(_) => {
            panic!("set operator survived folding: {}", ast)
        }
        MetaAst::Cat(seq) => {
            assert!(seq.len() >= 2, "cat of length {}", seq.len());
            for node in seq {
                assert!(!matches!(node, MetaAst::Cat(_) | MetaAst::Eps));
                assert_canonical(node);
            }
        }
        MetaAst::Count(count, inner) => {
            assert!(*count != 0 && *count != 1);
            assert_canonical(inner);
        }
        MetaAst::Charset(set) => {
            for window in set.ranges().windows(2) {
                assert!(window[0].end < window[1].start, "ranges overlap or touch");
            }
        }
        MetaAst::Star(inner) | MetaAst::Plus(inner) | MetaAst::Optional(inner)
        | MetaAst::Capture(inner) => assert_canonical(inner),
        MetaAst::Or(left, right)
        | MetaAst::GreaterThan(left, right)
        | MetaAst::LessThan(left, right)
        | MetaAst::Reject(left, right)
        | MetaAst::NoFollow(left, right) => {
            assert_canonical(left);
            assert_canonical(right);
        }
        _ => {}
    }
}

#[test]
fn alternation_of_charsets_folds_to_union() {
    let ast = folded(or(or(point('a'), point('b')), point('c')));
    assert_eq!(ast, charset(&[(0x61, 0x63)]));
    assert_canonical(&ast);
}

#[test]
fn reject_on_sets_is_difference() {
    let vowels = charset(&[
        (0x61, 0x61),
        (0x65, 0x65),
        (0x69, 0x69),
        (0x6F, 0x6F),
        (0x75, 0x75),
    ]);
    let ast = folded(MetaAst::Reject(
        Box::new(charset(&[(0x61, 0x7A)])),
        Box::new(vowels),
    ));
    assert_eq!(format!("{}", ast), "[b-df-hj-np-tv-z]");
    assert_canonical(&ast);
}

#[test]
fn intersect_on_sets_folds() {
    let ast = folded(MetaAst::Intersect(
        Box::new(charset(&[(0x61, 0x7A)])),
        Box::new(charset(&[(0x70, 0x74)])),
    ));
    assert_eq!(ast, charset(&[(0x70, 0x74)]));
}

#[test]
fn compliment_folds_against_the_universe() {
    let ast = folded(MetaAst::Compliment(Box::new(charset(&[(0x30, 0x39)]))));
    assert_eq!(ast, charset(&[(0, 0x2F), (0x3A, crate::MAX_UNICODE)]));
}

#[test]
fn nested_set_expression_collapses_at_once() {
    // (\U - [0-9]) & [0-z]
    let ast = folded(MetaAst::Intersect(
        Box::new(MetaAst::Reject(
            Box::new(MetaAst::Charset(CharSet::universe())),
            Box::new(charset(&[(0x30, 0x39)])),
        )),
        Box::new(charset(&[(0x30, 0x7A)])),
    ));
    assert_eq!(ast, charset(&[(0x3A, 0x7A)]));
}

#[test]
fn cat_of_strings_folds_to_concatenation() {
    let ast = folded(MetaAst::Cat(vec![string("hello"), string("world")]));
    assert_eq!(ast, string("helloworld"));
}

#[test]
fn identifiers_never_fold_into_strings() {
    let ast = folded(MetaAst::Cat(vec![identifier("id"), string("x")]));
    match &ast {
        MetaAst::Cat(seq) => {
            assert_eq!(seq.len(), 2);
            assert_eq!(seq[0], identifier("id"));
            assert_eq!(seq[1], string("x"));
        }
        other => panic!("expected a cat, got {}", other),
    }
}

#[test]
fn caseless_strings_never_fold_into_strings() {
    let ast = folded(MetaAst::Cat(vec![
        MetaAst::Caseless(UStr::from("ab")),
        string("cd"),
    ]));
    assert!(matches!(&ast, MetaAst::Cat(seq) if seq.len() == 2));
}

#[test]
fn repeat_normalization() {
    assert_eq!(folded(MetaAst::Count(0, Box::new(point('x')))), MetaAst::Eps);
    assert_eq!(folded(MetaAst::Count(1, Box::new(point('x')))), point('x'));

    let star_star = MetaAst::Star(Box::new(MetaAst::Star(Box::new(identifier("a")))));
    assert_eq!(folded(star_star), MetaAst::Star(Box::new(identifier("a"))));

    let plus_plus = MetaAst::Plus(Box::new(MetaAst::Plus(Box::new(identifier("a")))));
    assert_eq!(folded(plus_plus), MetaAst::Plus(Box::new(identifier("a"))));

    let star_plus = MetaAst::Star(Box::new(MetaAst::Plus(Box::new(identifier("a")))));
    assert_eq!(folded(star_plus), MetaAst::Star(Box::new(identifier("a"))));

    let plus_star = MetaAst::Plus(Box::new(MetaAst::Star(Box::new(identifier("a")))));
    assert_eq!(folded(plus_star), MetaAst::Star(Box::new(identifier("a"))));

    let opt_opt = MetaAst::Optional(Box::new(MetaAst::Optional(Box::new(identifier("a")))));
    assert_eq!(folded(opt_opt), MetaAst::Optional(Box::new(identifier("a"))));
}

#[test]
fn exact_repetition_is_kept_for_lowering() {
    // (A)k with k outside {0, 1} stays a count node
    let ast = folded(MetaAst::Count(3, Box::new(point('x'))));
    assert_eq!(ast, MetaAst::Count(3, Box::new(point('x'))));
    assert_canonical(&ast);
}

#[test]
fn cat_flattening_and_epsilon_absorption() {
    let ast = folded(MetaAst::Cat(vec![
        identifier("a"),
        MetaAst::Cat(vec![identifier("b"), identifier("c")]),
        MetaAst::Eps,
        identifier("d"),
    ]));
    match &ast {
        MetaAst::Cat(seq) => assert_eq!(seq.len(), 4),
        other => panic!("expected a cat, got {}", other),
    }
    assert_canonical(&ast);

    assert_eq!(folded(MetaAst::Cat(vec![])), MetaAst::Eps);
    assert_eq!(folded(MetaAst::Cat(vec![MetaAst::Eps])), MetaAst::Eps);
    assert_eq!(
        folded(MetaAst::Cat(vec![MetaAst::Eps, identifier("a")])),
        identifier("a")
    );
}

#[test]
fn alternation_chains_lean_right() {
    let ast = folded(or(or(identifier("a"), identifier("b")), identifier("c")));
    assert_eq!(
        ast,
        or(identifier("a"), or(identifier("b"), identifier("c")))
    );
}

#[test]
fn alternation_with_epsilon_becomes_option() {
    let ast = folded(or(identifier("a"), MetaAst::Eps));
    assert_eq!(ast, MetaAst::Optional(Box::new(identifier("a"))));

    let ast = folded(or(MetaAst::Eps, identifier("a")));
    assert_eq!(ast, MetaAst::Optional(Box::new(identifier("a"))));

    // a nullable alternative is left alone
    let nullable = or(MetaAst::Star(Box::new(identifier("a"))), MetaAst::Eps);
    assert_eq!(folded(nullable.clone()), nullable);
}

#[test]
fn capture_is_preserved() {
    let ast = folded(MetaAst::Capture(Box::new(point('x'))));
    assert!(matches!(ast, MetaAst::Capture(_)));

    let ast = folded(MetaAst::Capture(Box::new(MetaAst::Cat(vec![
        string("ab"),
        string("cd"),
    ]))));
    assert_eq!(ast, MetaAst::Capture(Box::new(string("abcd"))));
}

#[test]
fn set_operator_on_non_set_is_reported() {
    let mut ast = MetaAst::Intersect(Box::new(identifier("a")), Box::new(point('x')));
    assert_eq!(ast.fold(), Err(FoldError::SetOpOnNonSet("&")));

    let mut ast = MetaAst::Compliment(Box::new(string("ab")));
    assert_eq!(ast.fold(), Err(FoldError::SetOpOnNonSet("~")));

    // raised even when buried in an otherwise foldable tree
    let mut ast = MetaAst::Cat(vec![
        string("ok"),
        MetaAst::Compliment(Box::new(identifier("a"))),
    ]);
    assert_eq!(ast.fold(), Err(FoldError::SetOpOnNonSet("~")));
}

#[test]
fn folding_is_idempotent() {
    let ast = folded(MetaAst::Cat(vec![
        or(point('a'), point('b')),
        MetaAst::Star(Box::new(MetaAst::Star(Box::new(identifier("x"))))),
        MetaAst::Cat(vec![string("a"), string("b")]),
        MetaAst::Count(1, Box::new(identifier("y"))),
    ]));
    let before = ast.clone();
    let again = folded(ast);
    assert_eq!(again, before);
    assert_canonical(&again);
}

#[test]
fn folding_never_grows_the_tree() {
    let ast = MetaAst::Cat(vec![
        or(or(point('a'), point('b')), point('c')),
        MetaAst::Count(0, Box::new(identifier("x"))),
        MetaAst::Cat(vec![string("a"), MetaAst::Cat(vec![string("b")])]),
    ]);
    let before = ast.node_count();
    let after = folded(ast);
    assert!(after.node_count() <= before);
}

#[test]
fn display_parenthesizes_by_precedence() {
    let ast = MetaAst::Cat(vec![point('a'), or(identifier("b"), identifier("c"))]);
    assert_eq!(format!("{}", ast), "'a' (#b | #c)");

    let star_of_cat = MetaAst::Star(Box::new(MetaAst::Cat(vec![point('a'), point('b')])));
    assert_eq!(format!("{}", star_of_cat), "('a' 'b')*");

    let tight = MetaAst::Star(Box::new(point('a')));
    assert_eq!(format!("{}", tight), "'a'*");

    let count = MetaAst::Count(3, Box::new(point('x')));
    assert_eq!(format!("{}", count), "('x')3");

    let reject = MetaAst::Reject(
        Box::new(or(identifier("a"), identifier("b"))),
        Box::new(identifier("c")),
    );
    assert_eq!(format!("{}", reject), "(#a | #b) - #c");
}

#[test]
fn display_of_atoms() {
    assert_eq!(format!("{}", MetaAst::Eps), "\\e");
    assert_eq!(format!("{}", string("hello")), "\"hello\"");
    assert_eq!(
        format!("{}", MetaAst::Caseless(UStr::from("Hi"))),
        "i\"Hi\""
    );
    assert_eq!(format!("{}", identifier("rule")), "#rule");
    assert_eq!(format!("{}", point('a')), "'a'");
    assert_eq!(format!("{}", point('\'')), "'\\''");
    assert_eq!(format!("{}", MetaAst::Charset(CharSet::point(0xA))), "\\xA");
    assert_eq!(
        format!("{}", MetaAst::Charset(CharSet::universe())),
        "\\U"
    );
    assert_eq!(format!("{}", charset(&[(0x61, 0x7A)])), "[a-z]");
    assert_eq!(
        format!("{}", string("a\nb")),
        "\"a\\nb\""
    );
}

#[test]
fn repr_is_stable_and_indented() {
    let ast = MetaAst::Cat(vec![
        identifier("id"),
        MetaAst::Star(Box::new(point('x'))),
    ]);
    assert_eq!(ast.repr(), "cat\n  identifier(#id)\n  star\n    charset[x]\n");

    let count = MetaAst::Count(3, Box::new(string("ab")));
    assert_eq!(count.repr(), "count(3)\n  string(U\"ab\")\n");
}

#[test]
fn nullability() {
    assert!(MetaAst::Eps.is_nullable());
    assert!(MetaAst::Star(Box::new(identifier("a"))).is_nullable());
    assert!(MetaAst::Optional(Box::new(identifier("a"))).is_nullable());
    assert!(!identifier("a").is_nullable());
    assert!(!point('x').is_nullable());
    assert!(!MetaAst::Plus(Box::new(point('x'))).is_nullable());
    assert!(MetaAst::Count(0, Box::new(point('x'))).is_nullable());
    assert!(MetaAst::Cat(vec![MetaAst::Eps, MetaAst::Star(Box::new(point('x')))]).is_nullable());
    assert!(!MetaAst::Cat(vec![point('x'), MetaAst::Eps]).is_nullable());
    assert!(or(MetaAst::Eps, point('x')).is_nullable());
}
