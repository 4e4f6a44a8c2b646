//! Constant folding: a fixed-point rewriter that reduces a parsed tree to its
//! canonical form before CFG lowering.

use super::MetaAst;
use crate::{CharSet, FoldError, UStr};
use std::mem;

impl MetaAst {
    /// Rewrite the tree to its canonical folded form.
    ///
    /// Passes run bottom-up until none of them rewrites a node. After the
    /// fixed point, any surviving `&` or `~` node means a set operator was
    /// applied to an operand that cannot reduce to a charset, which is
    /// reported as [FoldError::SetOpOnNonSet]; the tree is left folded as far
    /// as it got.
    pub fn fold(&mut self) -> Result<(), FoldError> {
        while self.fold_pass() {}
        self.ensure_sets_folded()
    }

    /// One bottom-up rewriting pass. Returns whether any node was rewritten.
    pub(crate) fn fold_pass(&mut self) -> bool {
        let mut changed = false;
        match self {
            MetaAst::Star(inner)
            | MetaAst::Plus(inner)
            | MetaAst::Optional(inner)
            | MetaAst::Capture(inner)
            | MetaAst::Compliment(inner) => changed |= inner.fold_pass(),
            MetaAst::Count(_, inner) => changed |= inner.fold_pass(),
            MetaAst::Cat(seq) => {
                for node in seq.iter_mut() {
                    changed |= node.fold_pass();
                }
            }
            MetaAst::Or(left, right)
            | MetaAst::GreaterThan(left, right)
            | MetaAst::LessThan(left, right)
            | MetaAst::Reject(left, right)
            | MetaAst::NoFollow(left, right)
            | MetaAst::Intersect(left, right) => {
                changed |= left.fold_pass();
                changed |= right.fold_pass();
            }
            _ => {}
        }

        let node = mem::take(self);
        let (node, rewritten) = rewrite(node);
        *self = node;
        changed | rewritten
    }

    /// Evaluate a subtree built purely from charsets and set operators into a
    /// single set. `or` is union, `reject` difference, `intersect`
    /// intersection and `compliment` complement against the universe.
    fn try_fold_charset(&self) -> Option<CharSet> {
        match self {
            MetaAst::Charset(set) => Some(set.clone()),
            MetaAst::Or(left, right) => {
                Some(left.try_fold_charset()?.union(&right.try_fold_charset()?))
            }
            MetaAst::Reject(left, right) => Some(
                left.try_fold_charset()?
                    .difference(&right.try_fold_charset()?),
            ),
            MetaAst::Intersect(left, right) => Some(
                left.try_fold_charset()?
                    .intersection(&right.try_fold_charset()?),
            ),
            MetaAst::Compliment(inner) => Some(inner.try_fold_charset()?.complement()),
            _ => None,
        }
    }

    fn ensure_sets_folded(&self) -> Result<(), FoldError> {
        match self {
            MetaAst::Intersect(_, _) => Err(FoldError::SetOpOnNonSet("&")),
            MetaAst::Compliment(_) => Err(FoldError::SetOpOnNonSet("~")),
            MetaAst::Star(inner)
            | MetaAst::Plus(inner)
            | MetaAst::Optional(inner)
            | MetaAst::Count(_, inner)
            | MetaAst::Capture(inner) => inner.ensure_sets_folded(),
            MetaAst::Cat(seq) => {
                for node in seq {
                    node.ensure_sets_folded()?;
                }
                Ok(())
            }
            MetaAst::Or(left, right)
            | MetaAst::GreaterThan(left, right)
            | MetaAst::LessThan(left, right)
            | MetaAst::Reject(left, right)
            | MetaAst::NoFollow(left, right) => {
                left.ensure_sets_folded()?;
                right.ensure_sets_folded()
            }
            _ => Ok(()),
        }
    }
}

// Rewrite a single node whose children are already folded.
fn rewrite(node: MetaAst) -> (MetaAst, bool) {
    if !matches!(node, MetaAst::Charset(_)) {
        if let Some(set) = node.try_fold_charset() {
            return (MetaAst::Charset(set), true);
        }
    }
    match node {
        MetaAst::Star(inner) => match *inner {
            MetaAst::Star(deep) | MetaAst::Plus(deep) => (MetaAst::Star(deep), true),
            other => (MetaAst::Star(Box::new(other)), false),
        },
        MetaAst::Plus(inner) => match *inner {
            MetaAst::Plus(deep) => (MetaAst::Plus(deep), true),
            MetaAst::Star(deep) => (MetaAst::Star(deep), true),
            other => (MetaAst::Plus(Box::new(other)), false),
        },
        MetaAst::Optional(inner) => match *inner {
            MetaAst::Optional(deep) => (MetaAst::Optional(deep), true),
            other => (MetaAst::Optional(Box::new(other)), false),
        },
        MetaAst::Count(0, _) => (MetaAst::Eps, true),
        MetaAst::Count(1, inner) => (*inner, true),
        MetaAst::Cat(seq) => rewrite_cat(seq),
        MetaAst::Or(left, right) => rewrite_or(left, right),
        other => (other, false),
    }
}

fn rewrite_cat(seq: Vec<MetaAst>) -> (MetaAst, bool) {
    let mut changed = false;
    let mut flat: Vec<MetaAst> = Vec::with_capacity(seq.len());
    for node in seq {
        match node {
            MetaAst::Cat(inner) => {
                flat.extend(inner);
                changed = true;
            }
            MetaAst::Eps => changed = true,
            other => flat.push(other),
        }
    }
    if flat.is_empty() {
        return (MetaAst::Eps, true);
    }
    if flat.len() == 1 {
        return (flat.remove(0), true);
    }
    if flat.iter().all(|node| matches!(node, MetaAst::String(_))) {
        let mut merged = UStr::new();
        for node in flat {
            if let MetaAst::String(s) = node {
                merged.append(&s);
            }
        }
        return (MetaAst::String(merged), true);
    }
    (MetaAst::Cat(flat), changed)
}

fn rewrite_or(left: Box<MetaAst>, right: Box<MetaAst>) -> (MetaAst, bool) {
    match (*left, *right) {
        // canonical associativity: alternation chains lean right
        (MetaAst::Or(a, b), r) => (
            MetaAst::Or(a, Box::new(MetaAst::Or(b, Box::new(r)))),
            true,
        ),
        (MetaAst::Eps, other) if !other.is_nullable() => {
            (MetaAst::Optional(Box::new(other)), true)
        }
        (other, MetaAst::Eps) if !other.is_nullable() => {
            (MetaAst::Optional(Box::new(other)), true)
        }
        (l, r) => (MetaAst::Or(Box::new(l), Box::new(r)), false),
    }
}
