use crate::{CharRange, CharSet, MAX_UNICODE};

fn set(ranges: &[(u32, u32)]) -> CharSet {
    CharSet::from_ranges(ranges.iter().map(|(s, e)| CharRange::new(*s, *e)).collect())
}

#[test]
fn ranges_are_sorted_and_merged() {
    let s = set(&[(0x61, 0x66), (0x70, 0x7A), (0x63, 0x68)]);
    assert_eq!(
        s.ranges(),
        &[CharRange::new(0x61, 0x68), CharRange::new(0x70, 0x7A)]
    );

    // Adjacent ranges collapse into one.
    let adjacent = set(&[(0x61, 0x63), (0x64, 0x66)]);
    assert_eq!(adjacent.ranges(), &[CharRange::new(0x61, 0x66)]);
}

#[test]
fn union_of_points() {
    let s = CharSet::point(0x61)
        .union(&CharSet::point(0x63))
        .union(&CharSet::point(0x62));
    assert_eq!(s.ranges(), &[CharRange::new(0x61, 0x63)]);
    assert_eq!(s.size(), 3);
}

#[test]
fn difference_cuts_holes() {
    // [a-z] - [aeiou]
    let vowels = set(&[
        (0x61, 0x61),
        (0x65, 0x65),
        (0x69, 0x69),
        (0x6F, 0x6F),
        (0x75, 0x75),
    ]);
    let consonants = set(&[(0x61, 0x7A)]).difference(&vowels);
    assert_eq!(
        consonants.ranges(),
        &[
            CharRange::new(0x62, 0x64), // b-d
            CharRange::new(0x66, 0x68), // f-h
            CharRange::new(0x6A, 0x6E), // j-n
            CharRange::new(0x70, 0x74), // p-t
            CharRange::new(0x76, 0x7A), // v-z
        ]
    );
    assert_eq!(format!("{}", consonants), "[b-df-hj-np-tv-z]");
}

#[test]
fn difference_with_spanning_cut() {
    let s = set(&[(10, 20), (30, 40)]);
    let cut = set(&[(15, 35)]);
    assert_eq!(
        s.difference(&cut).ranges(),
        &[CharRange::new(10, 14), CharRange::new(36, 40)]
    );
}

#[test]
fn intersection_overlap() {
    // [a-z] & [p-t]
    let s = set(&[(0x61, 0x7A)]).intersection(&set(&[(0x70, 0x74)]));
    assert_eq!(s.ranges(), &[CharRange::new(0x70, 0x74)]);

    let disjoint = set(&[(0x61, 0x63)]).intersection(&set(&[(0x70, 0x74)]));
    assert!(disjoint.is_empty());
}

#[test]
fn complement_of_digits() {
    // ~[0-9]
    let s = set(&[(0x30, 0x39)]).complement();
    assert_eq!(
        s.ranges(),
        &[
            CharRange::new(0, 0x2F),
            CharRange::new(0x3A, MAX_UNICODE)
        ]
    );

    assert!(CharSet::new().complement().is_universe());
    assert!(CharSet::universe().complement().is_empty());
}

#[test]
fn complement_round_trip() {
    let s = set(&[(0x41, 0x5A), (0x61, 0x7A)]);
    assert_eq!(s.complement().complement(), s);
}

#[test]
fn contains_uses_binary_search() {
    let s = set(&[(0x30, 0x39), (0x61, 0x7A)]);
    assert!(s.contains(0x35));
    assert!(s.contains(0x61));
    assert!(s.contains(0x7A));
    assert!(!s.contains(0x40));
    assert!(!s.contains(0x7B));
}

#[test]
fn display_escapes_literal_members() {
    let s = set(&[(0x2D, 0x2D), (0x5D, 0x5D)]);
    assert_eq!(format!("{}", s), "[\\-\\]]");

    let tab = CharSet::point(0x9);
    assert_eq!(format!("{}", tab), "[\\x9]");
}
