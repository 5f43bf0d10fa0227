//! Metadata header extraction.
//!
//! A template may carry a fenced metadata block: a line of at least
//! three identical non-word characters, free-form YAML, and a closing
//! line of the same character repeated at least three times. The block
//! may sit anywhere in the source and may be wrapped in a `/* ... */`
//! block comment; the comment-wrapped form wins when both match, since
//! it keeps the header parseable as plain source outside the templating
//! system.
//!
//! ```text
//! /*
//! ---
//! title: Home
//! ---
//! */
//! html{ ... }
//! ```
//!
//! Extraction returns the parsed metadata mapping and the body with the
//! header block removed. A YAML failure is fatal; a header that parses
//! to a non-mapping value contributes no fields.

use crate::error::TemplateError;
use crate::value::{Mapping, Value};

/// Extract the metadata header, if any, from raw template source.
pub fn extract(source: &str) -> Result<(Mapping, String), TemplateError> {
    let Some(block) = find_fenced_block(source) else {
        return Ok((Mapping::new(), source.to_string()));
    };

    let header_text = &source[block.header.clone()];
    let value: Value = serde_yaml::from_str(header_text)?;
    let metadata = match value {
        Value::Mapping(map) => map,
        // Scalar or sequence headers merge no fields, mirroring an
        // object-assign from a non-object source.
        _ => Mapping::new(),
    };

    let removed = comment_wrapped_span(source, block.span.clone()).unwrap_or(block.span);
    let mut body = String::with_capacity(source.len() - (removed.end - removed.start));
    body.push_str(&source[..removed.start]);
    body.push_str(&source[removed.end..]);
    Ok((metadata, body))
}

struct FencedBlock {
    /// Byte range of the enclosed header text.
    header: std::ops::Range<usize>,
    /// Byte range of the whole block, opening fence line through
    /// closing fence line (trailing newline excluded).
    span: std::ops::Range<usize>,
}

/// The fence character of a line: its first character, repeated at
/// least three times, when that character is neither a word character
/// nor whitespace.
fn fence_char(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let c = chars.next()?;
    if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
        return None;
    }
    if chars.next()? != c || chars.next()? != c {
        return None;
    }
    Some(c)
}

/// Locate the first fence pair: an opening fence line and a later line
/// fenced with the same character.
fn find_fenced_block(source: &str) -> Option<FencedBlock> {
    let lines: Vec<(usize, &str)> = {
        let mut offset = 0;
        source
            .split_inclusive('\n')
            .map(|raw| {
                let start = offset;
                offset += raw.len();
                (start, raw.trim_end_matches(['\n', '\r']))
            })
            .collect()
    };

    for (i, &(open_start, open_line)) in lines.iter().enumerate() {
        let Some(c) = fence_char(open_line) else {
            continue;
        };
        for &(close_start, close_line) in &lines[i + 1..] {
            if fence_char(close_line) != Some(c) {
                continue;
            }
            let header_start = open_start + open_line.len() + 1; // past the newline
            return Some(FencedBlock {
                header: header_start.min(close_start)..close_start,
                span: open_start..close_start + close_line.len(),
            });
        }
    }
    None
}

/// If the fenced block sits inside a `/* ... */` comment with nothing
/// but whitespace between the closing fence and `*/`, widen the span to
/// cover the whole comment.
fn comment_wrapped_span(
    source: &str,
    span: std::ops::Range<usize>,
) -> Option<std::ops::Range<usize>> {
    let before = &source[..span.start];
    let open = before.rfind("/*")?;
    // A `*/` between the comment opener and the fence would close the
    // comment too early.
    if before[open..].contains("*/") {
        return None;
    }
    let after = &source[span.end..];
    let trimmed = after.trim_start();
    if !trimmed.starts_with("*/") {
        return None;
    }
    let close = span.end + (after.len() - trimmed.len()) + 2;
    Some(open..close)
}
