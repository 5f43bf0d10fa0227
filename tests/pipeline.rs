//! End-to-end pipeline tests: source text in, rendered document out.

use balisage::{Context, InvocationError, TagCategory, TemplateError, Value, compile, render};

#[test]
fn no_fence_means_empty_metadata_and_verbatim_body() {
    let src = "html{ ${p{hello}} }";
    let artifact = compile(src).unwrap();
    assert!(artifact.metadata().is_empty());
    assert_eq!(artifact.body(), src);
}

#[test]
fn header_fields_match_a_direct_parse() {
    let header = "title: Home\ncount: 3\nnested:\n  key: value\n";
    let src = format!("---\n{header}---\np{{x}}");
    let artifact = compile(&src).unwrap();

    let direct: Value = serde_yaml::from_str(header).unwrap();
    let direct = direct.as_mapping().unwrap();
    assert_eq!(artifact.metadata().len(), direct.len());
    for (key, value) in artifact.metadata() {
        assert_eq!(direct.get(key), Some(value));
    }
}

#[test]
fn comment_wrapped_header_reads_the_same_as_bare() {
    let bare = compile("---\ntitle: Home\n---\np{x}").unwrap();
    let wrapped = compile("/*\n---\ntitle: Home\n---\n*/\np{x}").unwrap();
    assert_eq!(bare.metadata(), wrapped.metadata());
}

#[test]
fn classification_is_deterministic_and_ordered() {
    let src = "html{${br{}}${p{}}${comment{c}}} span{}";
    let a = compile(src).unwrap();
    let b = compile(src).unwrap();
    assert_eq!(a.tags().regular, b.tags().regular);
    assert_eq!(a.tags().regular, vec!["html", "p", "span"]);
    assert_eq!(a.tags().irregular, vec!["br"]);
    assert_eq!(a.tags().special, vec!["comment"]);
}

#[test]
fn regular_round_trip() {
    let artifact = compile("p{hello}").unwrap();
    assert_eq!(artifact.invoke(&Context::new()).unwrap(), "<p>hello</p>");
}

#[test]
fn attribute_mappings_merge_in_encounter_order() {
    let artifact = compile(r#"div{${ {id:"x"} }${ {class:"y"} }body}"#).unwrap();
    assert_eq!(
        artifact.invoke(&Context::new()).unwrap(),
        r#"<div id="x" class="y">body</div>"#
    );
}

#[test]
fn later_attribute_keys_override_earlier_ones() {
    let artifact = compile(r#"div{${ {id:"x", class:"a"} }${ {id:"y"} }}"#).unwrap();
    assert_eq!(
        artifact.invoke(&Context::new()).unwrap(),
        r#"<div id="y" class="a"></div>"#
    );
}

#[test]
fn void_element_self_closes() {
    let artifact = compile("br{}").unwrap();
    let out = artifact.invoke(&Context::new()).unwrap();
    assert_eq!(out, "<br />");
    assert!(!out.contains("</br>"));
}

#[test]
fn doctype_shorthand_rewrites_at_its_source_location() {
    let artifact = compile("doctype{5}\nhtml{}").unwrap();
    assert_eq!(artifact.body(), "doctype{<!DOCTYPE html>}\nhtml{}");
    assert_eq!(
        artifact.invoke(&Context::new()).unwrap(),
        "<!DOCTYPE html><html></html>"
    );
}

#[test]
fn alien_registration_then_invocation() {
    let src = concat!(
        r#"custom_tags{foo ${ {startstart:"[", startend:"]", endstart:"[/", endend:"]"} }}"#,
        "foo{bar}",
    );
    let artifact = compile(src).unwrap();
    assert_eq!(artifact.invoke(&Context::new()).unwrap(), "[foo]bar[/foo]");
    assert_eq!(artifact.tags().category("foo"), Some(TagCategory::Alien));
}

#[test]
fn repeated_invocations_are_identical() {
    let artifact = compile("---\ntitle: Home\n---\nh1{${title}} p{${extra}}").unwrap();
    let mut context = Context::new();
    context.set("extra", Value::from("more"));
    let first = artifact.invoke(&context).unwrap();
    let second = artifact.invoke(&context).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "<h1>Home</h1><p>more</p>");
}

#[test]
fn unknown_tags_fail_at_invocation_not_compile() {
    let artifact = compile("div{${wombat{x}}}").unwrap();
    assert_eq!(artifact.tags().category("wombat"), None);
    let err = artifact.invoke(&Context::new()).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Invocation(InvocationError::UnknownTag(name)) if name == "wombat"
    ));
}

#[test]
fn full_page_renders_pretty() {
    let src = "\
/*
---
title: Demo
---
*/
doctype{5}
html{${head{${title{${title}}}}}${body{${h1{${title}}}${br{}}}}}";
    let out = render(src, &Context::new()).unwrap();
    assert_eq!(
        out,
        "<!DOCTYPE html>\n\
         <html>\n\
         \x20 <head>\n\
         \x20   <title>\n\
         \x20     Demo\n\
         \x20   </title>\n\
         \x20 </head>\n\
         \x20 <body>\n\
         \x20   <h1>\n\
         \x20     Demo\n\
         \x20   </h1>\n\
         \x20   <br />\n\
         \x20 </body>\n\
         </html>\n"
    );
}

#[test]
fn sitemap_style_xml_output() {
    let src = "doctype{xml}urlset{${url{${loc{/index}}}}}";
    let artifact = compile(src).unwrap();
    assert_eq!(
        artifact.invoke(&Context::new()).unwrap(),
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?><urlset><url><loc>/index</loc></url></urlset>"
    );
}

#[test]
fn metadata_parse_failure_is_fatal() {
    let err = compile("---\na: [unclosed\n---\np{x}").unwrap_err();
    assert!(matches!(err, TemplateError::MetadataParse(_)));
}

#[test]
fn syntax_error_reports_position() {
    let err = compile("p{ok}\nq{never closed").unwrap_err();
    let TemplateError::Syntax { line, .. } = err else {
        panic!("expected a syntax error, got {err:?}");
    };
    assert_eq!(line, 2);
}
