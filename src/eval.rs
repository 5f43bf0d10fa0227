//! The execution engine: a fixed evaluator over the parsed tree.
//!
//! Every classified tag renders through one of four category routines;
//! all of them share the attribute serializer and the content
//! interpolator. One mutable output accumulator threads down the call
//! stack: each routine appends its emission to the accumulator *and*
//! returns its own full string, so nested invocations compose either
//! way. An outer tag can use a child's return value while the
//! accumulator has already captured the child's output in document
//! order.
//!
//! ```text
//! eval_invocation(inv, doc)
//!     ├── regular   ──► <name attrs> content </name>
//!     ├── irregular ──► <name attrs  content />
//!     ├── special   ──► tag | txt | comment | custom_tags | doctype
//!     └── alien     ──► startstart name attrs startend ... endstart name endend
//! ```

use crate::ast::{Expr, Invocation};
use crate::classify::{AlienTokens, TagCategory, TagTable};
use crate::discover::leading_word;
use crate::error::{InvocationError, TemplateError};
use crate::value::{Mapping, Value};
use compact_str::CompactString;
use indexmap::IndexMap;

/// A prepared interpolation slot: either an already-evaluated value or
/// a nested invocation awaiting its emission point.
enum Slot<'a> {
    Val(Value),
    Call(&'a Invocation),
}

/// Interprets one artifact invocation against a merged render scope.
pub struct Evaluator<'a> {
    table: &'a TagTable,
    alien: &'a IndexMap<CompactString, AlienTokens>,
    scope: &'a Mapping,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        table: &'a TagTable,
        alien: &'a IndexMap<CompactString, AlienTokens>,
        scope: &'a Mapping,
    ) -> Self {
        Self {
            table,
            alien,
            scope,
        }
    }

    /// Execute the whole body with a fresh accumulator and return the
    /// accumulated document. Top-level return values are discarded; the
    /// accumulator already carries them.
    pub fn run(&self, tree: &'a [Invocation]) -> Result<String, TemplateError> {
        let mut doc = String::new();
        for inv in tree {
            self.eval_invocation(inv, &mut doc)?;
        }
        Ok(doc)
    }

    fn eval_invocation(
        &self,
        inv: &'a Invocation,
        doc: &mut String,
    ) -> Result<String, TemplateError> {
        match self.table.category(&inv.name) {
            Some(TagCategory::Regular) => {
                let mut slots = self.prepare_slots(inv)?;
                self.emit_element(&inv.name, &cooked(inv), &mut slots, true, doc)
            }
            Some(TagCategory::Irregular) => {
                let mut slots = self.prepare_slots(inv)?;
                self.emit_element(&inv.name, &cooked(inv), &mut slots, false, doc)
            }
            Some(TagCategory::Special) => self.emit_special(inv, doc),
            Some(TagCategory::Alien) => self.emit_alien(inv, doc),
            None => Err(InvocationError::UnknownTag(inv.name.to_string()).into()),
        }
    }

    /// Evaluate the slot expressions of a block. Nested invocations are
    /// kept unevaluated; they run at their interpolation position so
    /// the accumulator receives their output in document order.
    fn prepare_slots(&self, inv: &'a Invocation) -> Result<Vec<Slot<'a>>, TemplateError> {
        inv.block
            .slots
            .iter()
            .map(|expr| match expr {
                Expr::Call(nested) => Ok(Slot::Call(nested)),
                other => Ok(Slot::Val(self.eval_expr(other)?)),
            })
            .collect()
    }

    fn eval_expr(&self, expr: &Expr) -> Result<Value, TemplateError> {
        match expr {
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Object(fields) => {
                let mut map = Mapping::new();
                for (key, value) in fields {
                    map.insert(key.clone(), self.eval_expr(value)?);
                }
                Ok(Value::Mapping(map))
            }
            Expr::Path(path) => self.resolve_path(path),
            // The parser rejects invocations outside slot position, and
            // prepare_slots intercepts slot-position calls.
            Expr::Call(_) => unreachable!("nested invocations are prepared as slots"),
        }
    }

    /// Resolve a dotted path against the merged scope. A leading `this`
    /// names the scope root.
    fn resolve_path(&self, path: &[CompactString]) -> Result<Value, TemplateError> {
        let mut segments = path.iter().map(CompactString::as_str).peekable();
        if segments.peek() == Some(&"this") {
            segments.next();
        }
        let Some(first) = segments.next() else {
            return Ok(Value::Mapping(self.scope.clone()));
        };
        let mut current = self
            .scope
            .get(first)
            .ok_or_else(|| InvocationError::Undefined(first.to_string()))?;
        for segment in segments {
            current = current
                .as_mapping()
                .and_then(|map| map.get(segment))
                .ok_or_else(|| InvocationError::Undefined(path.join(".")))?;
        }
        Ok(current.clone())
    }

    // ------------------------------------------------------------------
    // Category routines
    // ------------------------------------------------------------------

    /// Paired and self-closing element emission.
    fn emit_element(
        &self,
        keyword: &str,
        segments: &[String],
        slots: &mut [Slot<'a>],
        paired: bool,
        doc: &mut String,
    ) -> Result<String, TemplateError> {
        let mut out = format!("<{keyword}");
        out.push_str(&serialize_attributes(slots));
        out.push(if paired { '>' } else { ' ' });
        doc.push_str(&out);
        out.push_str(&self.interpolate(segments, slots, doc)?);
        let close: String = if paired {
            format!("</{keyword}>")
        } else {
            "/>".to_string()
        };
        out.push_str(&close);
        doc.push_str(&close);
        Ok(out)
    }

    /// Behavior-tag dispatch.
    fn emit_special(&self, inv: &'a Invocation, doc: &mut String) -> Result<String, TemplateError> {
        let mut slots = self.prepare_slots(inv)?;
        let mut keyword = inv.name.as_str();
        let mut message_into_comment = "";
        let mut segments = cooked(inv);

        if keyword == "tag" {
            if let Some(word) = leading_word(&segments[0]).map(str::to_owned) {
                // A boolean slot selects void behavior; consume it.
                let mut is_void = false;
                for slot in slots.iter_mut() {
                    if let Slot::Val(Value::Bool(b)) = slot {
                        is_void = *b;
                        *slot = Slot::Val(Value::String(String::new()));
                        break;
                    }
                }
                // Drop the element name and its separator from the
                // first literal segment.
                let rest: String = segments[0][word.len()..].chars().skip(1).collect();
                segments[0] = rest;
                return self.emit_element(&word, &segments, &mut slots, !is_void, doc);
            }
            keyword = "comment";
            message_into_comment = "Error - empty first literal in \"tag\": ";
        }

        if keyword == "custom_tags" {
            let is_alien_declaration = slots.iter().any(|slot| {
                matches!(slot, Slot::Val(Value::Mapping(map)) if map.contains_key("startstart"))
            });
            if is_alien_declaration {
                // Alien declarations are compile-time only: no output.
                return Ok(String::new());
            }
            message_into_comment = "custom_tags: ";
        }

        // Leftover mappings on the special path become their JSON form.
        for slot in slots.iter_mut() {
            if let Slot::Val(value) = slot {
                if matches!(value, Value::Mapping(_)) {
                    *value = Value::String(value.to_json().to_string());
                }
            }
        }

        match keyword {
            "txt" => {
                let raw: Vec<String> =
                    inv.block.segments.iter().map(|s| s.raw.clone()).collect();
                self.interpolate(&raw, &mut slots, doc)
            }
            "comment" | "custom_tags" => {
                let mut out = format!("<!--{message_into_comment}");
                doc.push_str(&out);
                out.push_str(&self.interpolate(&segments, &mut slots, doc)?);
                out.push_str("-->");
                doc.push_str("-->");
                Ok(out)
            }
            "doctype" => {
                // Already resolved at discovery time; replay the literal.
                let out = segments[0].clone();
                doc.push_str(&out);
                Ok(out)
            }
            _ => Ok(String::new()),
        }
    }

    /// Alien emission from the registered four-token set. Empty tokens
    /// contribute nothing.
    fn emit_alien(&self, inv: &'a Invocation, doc: &mut String) -> Result<String, TemplateError> {
        let Some(tokens) = self.alien.get(inv.name.as_str()) else {
            return Err(InvocationError::UnknownTag(inv.name.to_string()).into());
        };
        let mut slots = self.prepare_slots(inv)?;

        let mut out = tokens.startstart.clone();
        if !tokens.startend.is_empty() {
            out.push_str(&inv.name);
        }
        out.push_str(&serialize_attributes(&mut slots));
        if !tokens.startend.is_empty() {
            out.push_str(&tokens.startend);
        }
        doc.push_str(&out);
        out.push_str(&self.interpolate(&cooked(inv), &mut slots, doc)?);
        if !tokens.endstart.is_empty() {
            let closing = format!("{}{}", tokens.endstart, inv.name);
            out.push_str(&closing);
            doc.push_str(&closing);
        }
        if !tokens.endend.is_empty() {
            out.push_str(&tokens.endend);
            doc.push_str(&tokens.endend);
        }
        Ok(out)
    }

    /// Walk literal segments and slots in lockstep
    /// (`segments.len() == slots.len() + 1`). Nested invocations run
    /// here, at their position; their return value joins the local
    /// output only, since their own emission already reached the
    /// accumulator.
    fn interpolate(
        &self,
        segments: &[String],
        slots: &mut [Slot<'a>],
        doc: &mut String,
    ) -> Result<String, TemplateError> {
        debug_assert_eq!(segments.len(), slots.len() + 1);
        let mut out = String::new();
        for (segment, slot) in segments.iter().zip(slots.iter_mut()) {
            out.push_str(segment);
            doc.push_str(segment);
            match slot {
                Slot::Call(nested) => {
                    out.push_str(&self.eval_invocation(nested, doc)?);
                }
                Slot::Val(value) => {
                    let text = value.render();
                    out.push_str(&text);
                    doc.push_str(&text);
                }
            }
        }
        if let Some(last) = segments.last() {
            out.push_str(last);
            doc.push_str(last);
        }
        Ok(out)
    }
}

/// The cooked literal segments of an invocation.
fn cooked(inv: &Invocation) -> Vec<String> {
    inv.block.segments.iter().map(|s| s.cooked.clone()).collect()
}

/// Merge every mapping slot into one attribute map (encounter order,
/// last write wins per key) and serialize ` key=<json>` pairs. Consumed
/// slots become empty strings so the interpolator does not re-emit them
/// as content.
fn serialize_attributes(slots: &mut [Slot<'_>]) -> String {
    let mut attributes = Mapping::new();
    for slot in slots.iter_mut() {
        if let Slot::Val(Value::Mapping(map)) = slot {
            for (key, value) in map.iter() {
                attributes.insert(key.clone(), value.clone());
            }
            *slot = Slot::Val(Value::String(String::new()));
        }
    }
    let mut out = String::new();
    for (key, value) in &attributes {
        out.push_str(&format!(" {key}={}", value.to_json()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::discover::discover;

    fn eval(body: &str) -> String {
        eval_with(body, &Mapping::new())
    }

    fn eval_with(body: &str, scope: &Mapping) -> String {
        let discovery = discover(body).unwrap();
        let table = classify(&discovery);
        Evaluator::new(&table, &discovery.alien_tokens, scope)
            .run(&discovery.tree)
            .unwrap()
    }

    fn eval_err(body: &str) -> TemplateError {
        let discovery = discover(body).unwrap();
        let table = classify(&discovery);
        Evaluator::new(&table, &discovery.alien_tokens, &Mapping::new())
            .run(&discovery.tree)
            .unwrap_err()
    }

    #[test]
    fn test_regular_tag() {
        assert_eq!(eval("p{hello}"), "<p>hello</p>");
    }

    #[test]
    fn test_irregular_tag_self_closes() {
        assert_eq!(eval("br{}"), "<br />");
    }

    #[test]
    fn test_nested_tags_accumulate_in_document_order() {
        assert_eq!(
            eval("html{${head{${title{x}}}}${body{}}}"),
            "<html><head><title>x</title></head><body></body></html>"
        );
    }

    #[test]
    fn test_attributes_merge_in_encounter_order() {
        assert_eq!(
            eval(r#"div{${ {id:"x"} }${ {class:"y"} }body}"#),
            r#"<div id="x" class="y">body</div>"#
        );
    }

    #[test]
    fn test_attribute_last_write_wins() {
        assert_eq!(
            eval(r#"div{${ {id:"x"} }${ {id:"y"} }}"#),
            r#"<div id="y"></div>"#
        );
    }

    #[test]
    fn test_numeric_attribute_unquoted() {
        assert_eq!(eval(r#"td{${ {colspan:2} }x}"#), "<td colspan=2>x</td>");
    }

    #[test]
    fn test_irregular_attributes() {
        assert_eq!(
            eval(r#"img{${ {src:"a.png"} }}"#),
            r#"<img src="a.png" />"#
        );
    }

    #[test]
    fn test_scalar_slots_concatenate() {
        assert_eq!(eval(r#"p{n=${5} s=${"x"} b=${true}}"#), "<p>n=5 s=x b=true</p>");
    }

    #[test]
    fn test_special_tag_dynamic_element() {
        assert_eq!(eval("tag{aside hello}"), "<aside>hello</aside>");
    }

    #[test]
    fn test_special_tag_void_flag() {
        assert_eq!(eval("tag{spacer ${true}}"), "<spacer />");
    }

    #[test]
    fn test_special_tag_empty_first_literal_becomes_error_comment() {
        let out = eval("tag{ oops}");
        assert!(out.starts_with("<!--Error - empty first literal in \"tag\": "));
        assert!(out.ends_with("-->"));
    }

    #[test]
    fn test_txt_uses_raw_segments() {
        assert_eq!(eval(r"txt{a\nb}"), r"a\nb");
        // The same escape cooks inside a regular tag.
        assert_eq!(eval(r"p{a\nb}"), "<p>a\nb</p>");
    }

    #[test]
    fn test_comment_tag() {
        assert_eq!(eval("comment{note}"), "<!--note-->");
    }

    #[test]
    fn test_custom_tags_html_declaration_renders_comment() {
        assert_eq!(
            eval("custom_tags{appframe}"),
            "<!--custom_tags: appframe-->"
        );
    }

    #[test]
    fn test_custom_tags_alien_declaration_is_silent() {
        let out = eval(r#"custom_tags{foo ${ {startstart:"["} }}"#);
        assert_eq!(out, "");
    }

    #[test]
    fn test_alien_four_token_emission() {
        let body = concat!(
            r#"custom_tags{foo ${ {startstart:"[", startend:"]", endstart:"[/", endend:"]"} }}"#,
            "foo{bar}",
        );
        assert_eq!(eval(body), "[foo]bar[/foo]");
    }

    #[test]
    fn test_alien_absent_tokens_contribute_nothing() {
        let body = concat!(
            r#"custom_tags{mark ${ {startstart:"|"} }}"#,
            "mark{x}",
        );
        // No startend: name and closing tokens are all suppressed.
        assert_eq!(eval(body), "|x");
    }

    #[test]
    fn test_doctype_replays_rewritten_literal() {
        assert_eq!(eval("doctype{5}"), "<!DOCTYPE html>");
    }

    #[test]
    fn test_unknown_tag_fails_at_invocation() {
        let err = eval_err("div{${wombat{x}}}");
        let TemplateError::Invocation(inner) = err else {
            panic!("expected invocation error");
        };
        assert_eq!(inner, InvocationError::UnknownTag("wombat".into()));
    }

    #[test]
    fn test_alien_without_token_set_fails_as_unknown() {
        // A routine table can outlive the registry it was built with;
        // an alien lookup miss reports the tag as unknown.
        let discovery = discover(concat!(
            r#"custom_tags{foo ${ {startstart:"["} }}"#,
            "foo{x}",
        ))
        .unwrap();
        let table = classify(&discovery);
        let empty = IndexMap::new();
        let scope = Mapping::new();
        let err = Evaluator::new(&table, &empty, &scope)
            .run(&discovery.tree)
            .unwrap_err();
        let TemplateError::Invocation(inner) = err else {
            panic!("expected invocation error");
        };
        assert_eq!(inner, InvocationError::UnknownTag("foo".into()));
    }

    #[test]
    fn test_context_path_resolution() {
        let mut scope = Mapping::new();
        scope.insert("title".into(), Value::from("Home"));
        assert_eq!(eval_with("h1{${title}}", &scope), "<h1>Home</h1>");
        assert_eq!(eval_with("h1{${this.title}}", &scope), "<h1>Home</h1>");
    }

    #[test]
    fn test_nested_path_resolution() {
        let mut inner = Mapping::new();
        inner.insert("name".into(), Value::from("demo"));
        let mut scope = Mapping::new();
        scope.insert("site".into(), Value::Mapping(inner));
        assert_eq!(eval_with("p{${site.name}}", &scope), "<p>demo</p>");
    }

    #[test]
    fn test_undefined_name_fails() {
        let err = eval_err("p{${missing}}");
        let TemplateError::Invocation(inner) = err else {
            panic!("expected invocation error");
        };
        assert_eq!(inner, InvocationError::Undefined("missing".into()));
    }

    #[test]
    fn test_mapping_from_context_merges_as_attributes() {
        let mut attrs = Mapping::new();
        attrs.insert("class".into(), Value::from("wide"));
        let mut scope = Mapping::new();
        scope.insert("attrs".into(), Value::Mapping(attrs));
        assert_eq!(
            eval_with("div{${attrs}x}", &scope),
            r#"<div class="wide">x</div>"#
        );
    }

    #[test]
    fn test_sequence_value_joins_with_commas() {
        let mut scope = Mapping::new();
        scope.insert(
            "items".into(),
            Value::Sequence(vec![Value::from("a"), Value::from("b")]),
        );
        assert_eq!(eval_with("p{${items}}", &scope), "<p>a,b</p>");
    }

    #[test]
    fn test_return_value_matches_accumulator_for_single_root() {
        let discovery = discover("div{${p{x}} after}").unwrap();
        let table = classify(&discovery);
        let scope = Mapping::new();
        let evaluator = Evaluator::new(&table, &discovery.alien_tokens, &scope);
        let mut doc = String::new();
        let ret = evaluator
            .eval_invocation(&discovery.tree[0], &mut doc)
            .unwrap();
        assert_eq!(ret, doc);
        assert_eq!(ret, "<div><p>x</p> after</div>");
    }
}
