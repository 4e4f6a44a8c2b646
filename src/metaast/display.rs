//! Infix and structural rendering of the meta-AST.
//!
//! [Display] prints the meta-syntax form back out, reparseable modulo
//! whitespace; [repr](MetaAst::repr) is a line-per-node structural dump and
//! [print](MetaAst::print) draws the tree the same way the downstream tooling
//! dumps its parse trees.

use super::MetaAst;
use crate::UStr;
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Display, Formatter, Write};

impl Display for MetaAst {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaAst::Eps => f.write_str("\\e"),
            MetaAst::String(s) => write_quoted(f, s, false),
            MetaAst::Caseless(s) => write_quoted(f, s, true),
            MetaAst::Identifier(name) => write!(f, "#{}", name),
            MetaAst::Charset(set) => {
                if set.is_universe() {
                    f.write_str("\\U")
                } else if set.ranges().len() == 1 && set.ranges()[0].size() == 1 {
                    let c = set.ranges()[0].start;
                    if (0x21..=0x7E).contains(&c) {
                        f.write_char('\'')?;
                        write_escaped(f, c, '\'')?;
                        f.write_char('\'')
                    } else {
                        write!(f, "\\x{:X}", c)
                    }
                } else {
                    Display::fmt(set, f)
                }
            }
            MetaAst::Star(inner) => {
                inner.write_inner(f, 1)?;
                f.write_char('*')
            }
            MetaAst::Plus(inner) => {
                inner.write_inner(f, 1)?;
                f.write_char('+')
            }
            MetaAst::Optional(inner) => {
                inner.write_inner(f, 1)?;
                f.write_char('?')
            }
            MetaAst::Compliment(inner) => {
                inner.write_inner(f, 1)?;
                f.write_char('~')
            }
            MetaAst::Count(count, inner) => write!(f, "({}){}", inner, count),
            MetaAst::Capture(inner) => write!(f, "{{{}}}", inner),
            MetaAst::Cat(seq) => {
                for (index, node) in seq.iter().enumerate() {
                    if index > 0 {
                        f.write_char(' ')?;
                    }
                    node.write_inner(f, 2)?;
                }
                Ok(())
            }
            MetaAst::Intersect(left, right) => {
                left.write_inner(f, 3)?;
                f.write_str(" & ")?;
                right.write_inner(f, 3)
            }
            MetaAst::NoFollow(left, right) => {
                left.write_inner(f, 4)?;
                f.write_str(" / ")?;
                right.write_inner(f, 4)
            }
            MetaAst::Reject(left, right) => {
                left.write_inner(f, 5)?;
                f.write_str(" - ")?;
                right.write_inner(f, 5)
            }
            MetaAst::GreaterThan(left, right) => {
                left.write_inner(f, 6)?;
                f.write_str(" > ")?;
                right.write_inner(f, 6)
            }
            MetaAst::LessThan(left, right) => {
                left.write_inner(f, 6)?;
                f.write_str(" < ")?;
                right.write_inner(f, 6)
            }
            MetaAst::Or(left, right) => {
                left.write_inner(f, 7)?;
                f.write_str(" | ")?;
                right.write_inner(f, 7)
            }
        }
    }
}

impl MetaAst {
    // A child at a looser precedence level than its parent needs parentheses
    // to reparse into the same shape.
    fn write_inner(&self, f: &mut Formatter<'_>, parent: u8) -> std::fmt::Result {
        if self.precedence() > parent {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    /// Structural dump of the tree: one node per line, two-space indentation
    /// per depth level, tag plus payload summary. Stable across runs.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.repr_inner(&mut out, 0);
        out
    }

    fn repr_inner(&self, out: &mut String, level: usize) {
        for _ in 0..level {
            out.push_str("  ");
        }
        out.push_str(&self.summary());
        out.push('\n');
        match self {
            MetaAst::Star(inner)
            | MetaAst::Plus(inner)
            | MetaAst::Optional(inner)
            | MetaAst::Count(_, inner)
            | MetaAst::Capture(inner)
            | MetaAst::Compliment(inner) => inner.repr_inner(out, level + 1),
            MetaAst::Cat(seq) => {
                for node in seq {
                    node.repr_inner(out, level + 1);
                }
            }
            MetaAst::Or(left, right)
            | MetaAst::GreaterThan(left, right)
            | MetaAst::LessThan(left, right)
            | MetaAst::Reject(left, right)
            | MetaAst::NoFollow(left, right)
            | MetaAst::Intersect(left, right) => {
                left.repr_inner(out, level + 1);
                right.repr_inner(out, level + 1);
            }
            _ => {}
        }
    }

    // One-line label: the tag, with the payload for leaf kinds.
    fn summary(&self) -> String {
        match self {
            MetaAst::String(s) => format!("string({:?})", s),
            MetaAst::Caseless(s) => format!("caseless({:?})", s),
            MetaAst::Identifier(name) => format!("identifier(#{})", name),
            MetaAst::Charset(set) => format!("{:?}", set),
            MetaAst::Count(count, _) => format!("count({})", count),
            other => other.tag().to_string(),
        }
    }

    /// Print the tree to stdout.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl TreeItem for MetaAst {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.summary())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match self {
            MetaAst::Star(inner)
            | MetaAst::Plus(inner)
            | MetaAst::Optional(inner)
            | MetaAst::Count(_, inner)
            | MetaAst::Capture(inner)
            | MetaAst::Compliment(inner) => Cow::Owned(vec![(**inner).clone()]),
            MetaAst::Cat(seq) => Cow::from(&seq[..]),
            MetaAst::Or(left, right)
            | MetaAst::GreaterThan(left, right)
            | MetaAst::LessThan(left, right)
            | MetaAst::Reject(left, right)
            | MetaAst::NoFollow(left, right)
            | MetaAst::Intersect(left, right) => {
                Cow::Owned(vec![(**left).clone(), (**right).clone()])
            }
            _ => Cow::Owned(Vec::new()),
        }
    }
}

// Strings always render double-quoted; the single-quote form is reserved for
// one-point charsets, which would otherwise reparse into a different node.
fn write_quoted(f: &mut Formatter<'_>, s: &UStr, caseless: bool) -> std::fmt::Result {
    if caseless {
        f.write_char('i')?;
    }
    f.write_char('"')?;
    for c in s.codepoints() {
        write_escaped(f, *c, '"')?;
    }
    f.write_char('"')
}

fn write_escaped(f: &mut Formatter<'_>, c: u32, quote: char) -> std::fmt::Result {
    match c {
        0x7 => f.write_str("\\a"),
        0x8 => f.write_str("\\b"),
        0x9 => f.write_str("\\t"),
        0xA => f.write_str("\\n"),
        0xB => f.write_str("\\v"),
        0xC => f.write_str("\\f"),
        0xD => f.write_str("\\r"),
        0x5C => f.write_str("\\\\"),
        _ if c == quote as u32 => {
            f.write_char('\\')?;
            f.write_char(quote)
        }
        _ => match char::from_u32(c) {
            Some(value) => f.write_char(value),
            None => write!(f, "\\x{:X}", c),
        },
    }
}
