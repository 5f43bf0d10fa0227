//! Static tag vocabularies and document-type declarations.
//!
//! These tables are fixed lookup configuration for the classifier: which
//! element names render paired, which render self-closed, and which names
//! are behavior tags rather than elements. The sets cover HTML 5, SVG 1.1,
//! XML sitemap elements and the obsolete HTML names.

// ============================================================================
// Element name sets
// ============================================================================

/// HTML 5 elements requiring a closing tag.
///
/// Note: the `var` element is out since it collides too easily with
/// template variables. Use `tag{var ...}` instead.
pub const NORMAL: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote", "body",
    "button", "canvas", "caption", "cite", "code", "colgroup", "datalist", "dd", "del", "details",
    "dfn", "div", "dl", "dt", "em", "fieldset", "figcaption", "figure", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "html", "i", "iframe", "ins", "kbd",
    "label", "legend", "li", "main", "map", "mark", "menu", "meter", "nav", "noscript", "object",
    "ol", "optgroup", "option", "output", "p", "pre", "progress", "q", "rp", "rt", "ruby", "s",
    "samp", "script", "section", "select", "small", "span", "strong", "style", "sub", "summary",
    "sup", "table", "tbody", "td", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "u",
    "ul", "video",
];

/// Self-closing (empty) HTML 5 elements.
pub const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "menuitem", "meta",
    "param", "source", "track", "wbr",
];

/// SVG 1.1 element names.
pub const SVG: &[&str] = &[
    "a", "altGlyph", "altGlyphDef", "altGlyphItem", "animate", "animateColor", "animateMotion",
    "animateTransform", "circle", "clipPath", "color-profile", "cursor", "defs", "desc", "ellipse",
    "feBlend", "feColorMatrix", "feComponentTransfer", "feComposite", "feConvolveMatrix",
    "feDiffuseLighting", "feDisplacementMap", "feDistantLight", "feFlood", "feFuncA", "feFuncB",
    "feFuncG", "feFuncR", "feGaussianBlur", "feImage", "feMerge", "feMergeNode", "feMorphology",
    "feOffset", "fePointLight", "feSpecularLighting", "feSpotLight", "feTile", "feTurbulence",
    "filter", "font", "font-face", "font-face-format", "font-face-name", "font-face-src",
    "font-face-uri", "foreignObject", "g", "glyph", "glyphRef", "hkern", "image", "line",
    "linearGradient", "marker", "mask", "metadata", "missing-glyph", "mpath", "path", "pattern",
    "polygon", "polyline", "radialGradient", "rect", "script", "set", "stop", "style", "svg",
    "symbol", "text", "textPath", "title", "tref", "tspan", "use", "view", "vkern",
];

/// XML sitemap element names.
pub const SITEMAP: &[&str] = &["urlset", "url", "loc", "lastmod", "changefreq", "priority"];

/// Obsolete HTML elements, paired form.
pub const OBSOLETE: &[&str] = &[
    "applet", "acronym", "bgsound", "dir", "frameset", "noframes", "isindex", "listing", "nextid",
    "noembed", "plaintext", "rb", "strike", "xmp", "big", "blink", "center", "font", "marquee",
    "multicol", "nobr", "spacer", "tt",
];

/// Obsolete HTML elements, self-closing form.
pub const OBSOLETE_VOID: &[&str] = &["basefont", "command", "frame", "keygen"];

/// Behavior tags. Not element names: each one alters rendering instead of
/// emitting a fixed element.
pub const SPECIAL: &[&str] = &["tag", "txt", "doctype", "comment", "custom_tags"];

// ============================================================================
// Membership
// ============================================================================

/// True if `name` renders as a paired element.
pub fn is_regular(name: &str) -> bool {
    NORMAL.contains(&name)
        || SVG.contains(&name)
        || SITEMAP.contains(&name)
        || OBSOLETE.contains(&name)
}

/// True if `name` renders as a self-closing element.
pub fn is_irregular(name: &str) -> bool {
    VOID.contains(&name) || OBSOLETE_VOID.contains(&name)
}

/// True if `name` is a behavior tag.
pub fn is_special(name: &str) -> bool {
    SPECIAL.contains(&name)
}

// ============================================================================
// Document types
// ============================================================================

/// Declaration emitted for `doctype{...}` when the keyword is unknown.
pub const DEFAULT_DOCTYPE: &str = "<!DOCTYPE html>";

/// Look up the canonical declaration for a `doctype{...}` keyword.
pub fn doctype(keyword: &str) -> Option<&'static str> {
    Some(match keyword {
        "default" | "5" => DEFAULT_DOCTYPE,
        "xml" => r#"<?xml version="1.0" encoding="utf-8" ?>"#,
        "transitional" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#
        }
        "strict" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#
        }
        "frameset" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Frameset//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd">"#
        }
        "1.1" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#
        }
        "basic" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML Basic 1.1//EN" "http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd">"#
        }
        "mobile" => {
            r#"<!DOCTYPE html PUBLIC "-//WAPFORUM//DTD XHTML Mobile 1.2//EN" "http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd">"#
        }
        "ce" => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "ce-html-1.0-transitional.dtd">"#
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_membership() {
        assert!(is_regular("p"));
        assert!(is_regular("svg"));
        assert!(is_regular("urlset"));
        assert!(is_regular("marquee"));
        assert!(!is_regular("br"));
        assert!(!is_regular("var")); // deliberately excluded
        assert!(!is_regular("wombat"));
    }

    #[test]
    fn test_irregular_membership() {
        assert!(is_irregular("br"));
        assert!(is_irregular("meta"));
        assert!(is_irregular("keygen"));
        assert!(!is_irregular("div"));
    }

    #[test]
    fn test_special_membership() {
        for name in ["tag", "txt", "doctype", "comment", "custom_tags"] {
            assert!(is_special(name), "{name} should be special");
        }
        assert!(!is_special("p"));
    }

    #[test]
    fn test_hyphenated_svg_names() {
        assert!(is_regular("font-face-src"));
        assert!(is_regular("missing-glyph"));
    }

    #[test]
    fn test_sets_are_disjoint_from_special() {
        for name in SPECIAL {
            assert!(!is_regular(name));
            assert!(!is_irregular(name));
        }
    }

    #[test]
    fn test_doctype_lookup() {
        assert_eq!(doctype("5"), Some("<!DOCTYPE html>"));
        assert_eq!(doctype("default"), Some("<!DOCTYPE html>"));
        assert!(doctype("xml").unwrap().starts_with("<?xml"));
        assert!(doctype("1.1").unwrap().contains("XHTML 1.1"));
        assert_eq!(doctype("html9"), None);
    }
}
