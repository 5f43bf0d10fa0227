//! Tag classification.
//!
//! Discovered tag names partition into four ordered, duplicate-free
//! category lists. Priority: alien registration, then the void-element
//! vocabulary, then the behavior-tag set, then the regular vocabulary.
//! A name matching none of these is dropped silently: no rendering
//! routine exists for it, so invoking it fails at artifact invocation,
//! not at compile time.

use crate::ast::Expr;
use crate::discover::Discovery;
use crate::vocab;
use compact_str::CompactString;
use indexmap::IndexMap;

/// Rendering category of a classified tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    /// Paired `<name ...>content</name>`.
    Regular,
    /// Self-closing `<name ... />`.
    Irregular,
    /// Behavior tag: `tag`, `txt`, `doctype`, `comment`, `custom_tags`.
    Special,
    /// User-declared open/close token pair.
    Alien,
}

/// Delimiter tokens for one alien tag. Empty tokens contribute nothing
/// at emission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlienTokens {
    pub startstart: String,
    pub startend: String,
    pub endstart: String,
    pub endend: String,
}

impl AlienTokens {
    /// Build a token set from an object-literal declaration. Only
    /// string-valued fields count; anything else is ignored.
    pub(crate) fn from_fields(fields: &[(String, Expr)]) -> Self {
        let pick = |key: &str| {
            fields
                .iter()
                .find_map(|(k, v)| match v {
                    Expr::Str(s) if k == key => Some(s.clone()),
                    _ => None,
                })
                .unwrap_or_default()
        };
        Self {
            startstart: pick("startstart"),
            startend: pick("startend"),
            endstart: pick("endstart"),
            endend: pick("endend"),
        }
    }
}

/// The classified tag lists, plus a name -> category index used by the
/// evaluator as its routine table.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    pub regular: Vec<CompactString>,
    pub irregular: Vec<CompactString>,
    pub special: Vec<CompactString>,
    pub alien: Vec<CompactString>,
    index: IndexMap<CompactString, TagCategory>,
}

impl TagTable {
    /// Category of a classified name; `None` for dropped names.
    pub fn category(&self, name: &str) -> Option<TagCategory> {
        self.index.get(name).copied()
    }

    /// Every classified name, in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &CompactString> {
        self.index.keys()
    }
}

/// Partition the discovery list into the four category lists.
///
/// Pure in (names, vocabularies, registrations): classifying the same
/// discovery twice yields identical lists in identical order.
pub fn classify(discovery: &Discovery) -> TagTable {
    let mut table = TagTable::default();
    for name in &discovery.names {
        let category = if discovery.alien_tokens.contains_key(name) {
            TagCategory::Alien
        } else if discovery.custom_irregular.contains(name) || vocab::is_irregular(name) {
            TagCategory::Irregular
        } else if vocab::is_special(name) {
            TagCategory::Special
        } else if discovery.custom_regular.contains(name) || vocab::is_regular(name) {
            TagCategory::Regular
        } else {
            continue; // unrecognized: dropped, never rendered as a tag
        };
        if table.index.contains_key(name) {
            continue;
        }
        match category {
            TagCategory::Regular => table.regular.push(name.clone()),
            TagCategory::Irregular => table.irregular.push(name.clone()),
            TagCategory::Special => table.special.push(name.clone()),
            TagCategory::Alien => table.alien.push(name.clone()),
        }
        table.index.insert(name.clone(), category);
    }
    table
}
