//! Output pretty-printer.
//!
//! A pure reformatting pass over the evaluator's single-line document:
//! the text splits into markup tokens and text runs, each token lands on
//! its own line, and nesting depth (two spaces per open paired element)
//! drives the indent. Declarations, comments and self-closed elements
//! never change the depth. The result always ends in exactly one
//! newline.
//!
//! `render` applies this pass; `Artifact::invoke` never does, so callers
//! that need the exact evaluator output keep it.

/// One lexical piece of the rendered document.
#[derive(Debug, PartialEq)]
enum Token<'a> {
    /// `<name ...>`
    Open(&'a str),
    /// `</name>`
    Close(&'a str),
    /// `<... />`, `<!...>`, `<?...?>`, `<!-- ... -->`
    Flat(&'a str),
    /// Anything between markup tokens.
    Text(&'a str),
}

/// Reformat a rendered document with depth-based indentation.
pub fn format(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut depth: usize = 0;
    for token in tokenize(text) {
        match token {
            Token::Close(tag) => {
                depth = depth.saturating_sub(1);
                push_line(&mut out, depth, tag);
            }
            Token::Open(tag) => {
                push_line(&mut out, depth, tag);
                depth += 1;
            }
            Token::Flat(tag) => push_line(&mut out, depth, tag),
            Token::Text(run) => {
                let trimmed = run.trim();
                if !trimmed.is_empty() {
                    push_line(&mut out, depth, trimmed);
                }
            }
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(content);
    out.push('\n');
}

/// Split the document into markup tokens and text runs. Quoted
/// attribute values may contain `>`, so the scan is quote-aware. An
/// unterminated `<` falls through as text.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }
        let tail = &rest[open..];
        let Some(len) = tag_len(tail) else {
            tokens.push(Token::Text(tail));
            return tokens;
        };
        tokens.push(classify_tag(&tail[..len]));
        rest = &tail[len..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

/// Byte length of the markup token starting at `<`, or `None` when it
/// never closes.
fn tag_len(tail: &str) -> Option<usize> {
    if tail.starts_with("<!--") {
        return tail.find("-->").map(|end| end + 3);
    }
    let mut quote: Option<char> = None;
    for (i, c) in tail.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            (None, _) => {}
        }
    }
    None
}

fn classify_tag(tag: &str) -> Token<'_> {
    if tag.starts_with("</") {
        Token::Close(tag)
    } else if tag.starts_with("<!") || tag.starts_with("<?") || tag.ends_with("/>") {
        Token::Flat(tag)
    } else {
        Token::Open(tag)
    }
}
