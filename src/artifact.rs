//! The compiled artifact.
//!
//! `compile` bundles everything the four front-end stages produced into
//! an [`Artifact`]: the resolved body text, the expression tree, the
//! classified tag table, the alien token registry and the header
//! metadata. The artifact is inert data; each [`Artifact::invoke`]
//! builds a fresh merged scope and a fresh accumulator, so one artifact
//! renders any number of times, with different contexts, independently.

use crate::ast::Invocation;
use crate::classify::{AlienTokens, TagTable};
use crate::error::TemplateError;
use crate::eval::Evaluator;
use crate::value::{Context, Mapping};
use compact_str::CompactString;
use indexmap::IndexMap;

/// A compiled template, ready to render.
#[derive(Debug)]
pub struct Artifact {
    body: String,
    tree: Vec<Invocation>,
    table: TagTable,
    alien_tokens: IndexMap<CompactString, AlienTokens>,
    metadata: Mapping,
}

impl Artifact {
    pub(crate) fn new(
        body: String,
        tree: Vec<Invocation>,
        table: TagTable,
        alien_tokens: IndexMap<CompactString, AlienTokens>,
        metadata: Mapping,
    ) -> Self {
        Self {
            body,
            tree,
            table,
            alien_tokens,
            metadata,
        }
    }

    /// Render once against a caller context. The render scope is the
    /// header metadata with the caller's entries merged over it; the
    /// caller wins on key collision. Neither side is mutated.
    pub fn invoke(&self, context: &Context) -> Result<String, TemplateError> {
        let mut scope = self.metadata.clone();
        for (key, value) in context.iter() {
            scope.insert(key.clone(), value.clone());
        }
        Evaluator::new(&self.table, &self.alien_tokens, &scope).run(&self.tree)
    }

    /// Header metadata parsed at compile time.
    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    /// The template body after header removal and doctype resolution.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The classified tag table.
    pub fn tags(&self) -> &TagTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use crate::value::Value;

    #[test]
    fn test_metadata_feeds_the_render_scope() {
        let artifact = compile("---\ntitle: Home\n---\nh1{${title}}").unwrap();
        let out = artifact.invoke(&Context::new()).unwrap();
        assert_eq!(out, "<h1>Home</h1>");
    }

    #[test]
    fn test_context_overrides_metadata() {
        let artifact = compile("---\ntitle: Home\n---\nh1{${title}}").unwrap();
        let mut context = Context::new();
        context.set("title", Value::from("About"));
        assert_eq!(artifact.invoke(&context).unwrap(), "<h1>About</h1>");
        // The artifact's own metadata is untouched.
        assert_eq!(artifact.metadata()["title"], Value::from("Home"));
    }

    #[test]
    fn test_repeat_invocations_are_independent() {
        let artifact = compile("p{${name}}").unwrap();
        let mut a = Context::new();
        a.set("name", Value::from("one"));
        let mut b = Context::new();
        b.set("name", Value::from("two"));
        assert_eq!(artifact.invoke(&a).unwrap(), "<p>one</p>");
        assert_eq!(artifact.invoke(&b).unwrap(), "<p>two</p>");
        assert_eq!(artifact.invoke(&a).unwrap(), "<p>one</p>");
    }

    #[test]
    fn test_body_reflects_doctype_resolution() {
        let artifact = compile("---\na: 1\n---\ndoctype{5} html{}").unwrap();
        assert!(artifact.body().contains("<!DOCTYPE html>"));
        assert!(!artifact.body().contains("a: 1"));
    }

    #[test]
    fn test_tag_table_accessor() {
        let artifact = compile("html{${br{}}}").unwrap();
        assert_eq!(artifact.tags().regular, vec!["html"]);
        assert_eq!(artifact.tags().irregular, vec!["br"]);
    }
}
