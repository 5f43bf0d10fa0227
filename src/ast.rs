//! Expression tree for template bodies.
//!
//! A body parses into a flat list of tag invocations; nesting happens
//! through interpolation slots. Literal segments keep both their raw and
//! cooked forms so `txt{...}` can bypass escape processing.

use compact_str::CompactString;
use std::ops::Range;

/// One tag invocation: an identifier applied to a content block.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: CompactString,
    pub block: Block,
}

/// The content block of an invocation.
///
/// Invariant: `segments.len() == slots.len() + 1`. Literal segments and
/// interpolation slots interleave, with literals on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub segments: Vec<Segment>,
    pub slots: Vec<Expr>,
    /// Byte span of the block interior (between the braces) in the body
    /// text. Used for the compile-time doctype rewrite.
    pub inner: Range<usize>,
}

/// A literal segment of a content block.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Verbatim source text, escapes untouched.
    pub raw: String,
    /// Escape-processed text.
    pub cooked: String,
}

/// An interpolation slot expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Number(f64),
    Bool(bool),
    /// Object literal, fields in source order.
    Object(Vec<(String, Expr)>),
    /// Dotted variable path, resolved against the render context.
    /// A leading `this` segment is allowed and refers to the context root.
    Path(Vec<CompactString>),
    /// Nested tag invocation in value position.
    Call(Invocation),
}

impl Invocation {
    /// Visit this invocation and every nested one, in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Invocation)) {
        visit(self);
        for slot in &self.block.slots {
            if let Expr::Call(inner) = slot {
                inner.walk(visit);
            }
        }
    }
}

/// Visit every invocation in a parsed body, in source order.
pub fn walk_all<'a>(tree: &'a [Invocation], visit: &mut impl FnMut(&'a Invocation)) {
    for inv in tree {
        inv.walk(visit);
    }
}
