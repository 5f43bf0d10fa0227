//! balisage: a tagged-markup template compiler.
//!
//! Templates pair a fenced metadata header with a body of tag
//! invocations:
//!
//! ```text
//! /*
//! ---
//! title: Home
//! ---
//! */
//! doctype{5}
//! html{
//!     ${head{ ${title{ ${title} }} }}
//!     ${body{ ${h1{ ${title} }} }}
//! }
//! ```
//!
//! Compilation runs four stages over the source:
//!
//! ```text
//! source ──► header    ──► (metadata, body)
//!        ──► discover  ──► tree + tag names + registrations
//!        ──► classify  ──► routine table (regular/irregular/special/alien)
//!        ──► artifact  ──► Artifact { tree, table, tokens, metadata }
//! ```
//!
//! The [`Artifact`] renders any number of times against caller
//! contexts; [`render`] is the one-shot path that also pretty-prints.
//!
//! ```
//! use balisage::{render, Context, Value};
//!
//! let mut context = Context::new();
//! context.set("name", Value::from("world"));
//! let html = render("p{hello ${name}}", &context).unwrap();
//! assert_eq!(html, "<p>\n  hello world\n</p>\n");
//! ```

pub mod artifact;
pub mod ast;
pub mod beautify;
pub mod classify;
pub mod discover;
pub mod error;
pub mod eval;
pub mod header;
#[macro_use]
pub mod logger;
pub mod parser;
pub mod value;
pub mod vocab;

pub use artifact::Artifact;
pub use classify::{TagCategory, TagTable};
pub use error::{InvocationError, TemplateError};
pub use value::{Context, Mapping, Value};

/// Crate version, re-exported for embedders.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile template source into an invocable artifact.
///
/// Runs header extraction, tag discovery (with doctype resolution and
/// `custom_tags` registration) and classification. Syntax and metadata
/// errors are fatal; unknown tag names are not, they fail later at
/// invocation if actually rendered.
pub fn compile(source: &str) -> Result<Artifact, TemplateError> {
    let (metadata, body) = header::extract(source)?;
    let discovery = discover::discover(&body)?;
    let table = classify::classify(&discovery);
    Ok(Artifact::new(
        discovery.body,
        discovery.tree,
        table,
        discovery.alien_tokens,
        metadata,
    ))
}

/// Compile, invoke once against `context`, and pretty-print the result.
///
/// Failures are reported through the logger (syntax errors with a caret
/// diagnostic) before being returned.
pub fn render(source: &str, context: &Context) -> Result<String, TemplateError> {
    let report = |err: TemplateError| {
        match err.caret_report() {
            Some(diagnostic) => log!("render"; "{diagnostic}"),
            None => log!("error"; "{err}"),
        }
        err
    };
    let artifact = compile(source).map_err(report)?;
    let document = artifact.invoke(context).map_err(report)?;
    Ok(beautify::format(&document))
}
