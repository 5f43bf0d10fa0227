//! Tag discovery.
//!
//! One traversal of the parsed body collects every distinct tag name in
//! first-seen order and handles the two reserved declarations:
//!
//! - `doctype{...}`: resolved here, at compile time, by rewriting the
//!   block interior in the body text to the canonical declaration
//!   string (then reparsing). The runtime routine only replays the
//!   rewritten literal.
//! - `custom_tags{...}`: extends the regular or irregular category with
//!   user-declared names, or, when a slot carries a `startstart` object
//!   literal, registers an alien token set for each declared name.

use crate::ast::{self, Expr, Invocation};
use crate::classify::AlienTokens;
use crate::error::TemplateError;
use crate::parser::parse_body;
use crate::vocab;
use compact_str::CompactString;
use indexmap::IndexMap;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static LEADING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]+").unwrap());
static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9A-Za-z_]+").unwrap());

/// First word of a literal segment, if it starts with one.
pub(crate) fn leading_word(text: &str) -> Option<&str> {
    LEADING_WORD.find(text).map(|m| m.as_str())
}

/// Everything the discovery pass learned about one template body.
#[derive(Debug)]
pub struct Discovery {
    /// The body after doctype resolution.
    pub body: String,
    /// The final expression tree (reparsed when a rewrite happened).
    pub tree: Vec<Invocation>,
    /// Every distinct tag name, invoked or declared, first-seen order.
    pub names: Vec<CompactString>,
    /// Names declared paired via `custom_tags`.
    pub custom_regular: Vec<CompactString>,
    /// Names declared self-closing via `custom_tags{... ${true}}`.
    pub custom_irregular: Vec<CompactString>,
    /// Token sets for alien declarations, first declaration wins.
    pub alien_tokens: IndexMap<CompactString, AlienTokens>,
}

/// Which category bucket a `custom_tags` declaration targets.
#[derive(PartialEq, Eq, Clone, Copy)]
enum Bucket {
    Regular,
    Irregular,
    Alien,
}

/// Run the discovery pass over a template body.
pub fn discover(body: &str) -> Result<Discovery, TemplateError> {
    let mut tree = parse_body(body)?;
    let mut body = body.to_string();

    // Doctype shorthand resolves before anything else is observable.
    let rewrites = doctype_rewrites(&tree);
    if !rewrites.is_empty() {
        for (range, declaration) in rewrites.into_iter().rev() {
            body.replace_range(range, declaration);
        }
        tree = parse_body(&body)?;
    }

    let mut names: Vec<CompactString> = Vec::new();
    let mut custom_regular: Vec<CompactString> = Vec::new();
    let mut custom_irregular: Vec<CompactString> = Vec::new();
    let mut alien_tokens: IndexMap<CompactString, AlienTokens> = IndexMap::new();

    ast::walk_all(&tree, &mut |inv| {
        if !names.contains(&inv.name) {
            names.push(inv.name.clone());
        }
        if inv.name == "custom_tags" {
            register_custom_tags(
                inv,
                &mut names,
                &mut custom_regular,
                &mut custom_irregular,
                &mut alien_tokens,
            );
        }
    });

    Ok(Discovery {
        body,
        tree,
        names,
        custom_regular,
        custom_irregular,
        alien_tokens,
    })
}

/// Collect the block-interior spans of every `doctype` invocation,
/// paired with the declaration text to substitute. Spans are in source
/// order; unknown keywords fall back to the default declaration.
fn doctype_rewrites(tree: &[Invocation]) -> Vec<(Range<usize>, &'static str)> {
    let mut rewrites = Vec::new();
    ast::walk_all(tree, &mut |inv| {
        if inv.name == "doctype" {
            let declaration = leading_word(&inv.block.segments[0].cooked)
                .and_then(vocab::doctype)
                .unwrap_or(vocab::DEFAULT_DOCTYPE);
            rewrites.push((inv.block.inner.clone(), declaration));
        }
    });
    rewrites
}

/// Process one `custom_tags` declaration.
///
/// A boolean slot picks paired (false, the default) vs self-closing
/// (true); an object slot with a `startstart` key switches to an alien
/// declaration and carries the token set. The last relevant slot wins.
/// Declared names are the words of the literal segments.
fn register_custom_tags(
    inv: &Invocation,
    names: &mut Vec<CompactString>,
    custom_regular: &mut Vec<CompactString>,
    custom_irregular: &mut Vec<CompactString>,
    alien_tokens: &mut IndexMap<CompactString, AlienTokens>,
) {
    let mut bucket = Bucket::Regular;
    let mut tokens = AlienTokens::default();
    for slot in &inv.block.slots {
        match slot {
            Expr::Bool(is_void) => {
                bucket = if *is_void {
                    Bucket::Irregular
                } else {
                    Bucket::Regular
                };
            }
            Expr::Object(fields) if fields.iter().any(|(k, _)| k == "startstart") => {
                bucket = Bucket::Alien;
                tokens = AlienTokens::from_fields(fields);
            }
            _ => {}
        }
    }

    let mut declared = String::new();
    for segment in &inv.block.segments {
        declared.push_str(&segment.cooked);
        declared.push(' ');
    }
    for word in WORDS.find_iter(&declared) {
        let word = CompactString::from(word.as_str());
        if !names.contains(&word) {
            names.push(word.clone());
        }
        match bucket {
            Bucket::Regular => {
                if !custom_regular.contains(&word) {
                    custom_regular.push(word);
                }
            }
            Bucket::Irregular => {
                if !custom_irregular.contains(&word) {
                    custom_irregular.push(word);
                }
            }
            Bucket::Alien => {
                alien_tokens.entry(word).or_insert_with(|| tokens.clone());
            }
        }
    }
}
