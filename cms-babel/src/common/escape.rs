//! Markdown escaping for literal text entering the rich tree.
//!
//! Text leaves in the rich tree hold Markdown source: the serializer emits
//! them verbatim so syntax typed into the editor survives. Literal text coming
//! from the document AST (an unescaped `text` node) is therefore escaped on
//! the way in, so `1 \*not emphasis\*` is still plain text after a save.
//!
//! Only characters that can start markup are escaped. `#`, `>`, `-`, `+`, `=`
//! and ordered-list markers (`1.`, `2)`) only matter at the start of a line.

/// Characters escaped wherever they appear.
const ALWAYS: &[char] = &['\\', '*', '_', '[', ']', '<', '`', '~', '|'];

/// Characters escaped when they open a line.
const LINE_START: &[char] = &['#', '>', '-', '+', '='];

/// Escapes `text` so Markdown reads it back as the same literal text.
///
/// `at_line_start` tells whether the text begins a line in its block.
pub(crate) fn escape_markdown(text: &str, at_line_start: bool) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut line_start = at_line_start;
    let mut chars = text.char_indices();

    while let Some((index, c)) = chars.next() {
        if line_start {
            if c == ' ' || c == '\t' {
                out.push(c);
                continue;
            }
            line_start = false;
            if LINE_START.contains(&c) {
                out.push('\\');
            } else if c.is_ascii_digit() {
                let digits = text[index..].bytes().take_while(u8::is_ascii_digit).count();
                if matches!(text.as_bytes().get(index + digits), Some(b'.' | b')')) {
                    out.push_str(&text[index..index + digits]);
                    out.push('\\');
                    for _ in 1..digits {
                        chars.next();
                    }
                    continue;
                }
            }
        }

        if ALWAYS.contains(&c) || (c == '&' && opens_entity(&text[index + 1..])) {
            out.push('\\');
        }
        out.push(c);
        if c == '\n' {
            line_start = true;
        }
    }
    out
}

/// True when `rest` (the text after a `&`) reads as an entity reference,
/// e.g. `amp;` or `#42;`.
fn opens_entity(rest: &str) -> bool {
    let body = rest.strip_prefix('#').unwrap_or(rest);
    let name = body.bytes().take_while(u8::is_ascii_alphanumeric).count();
    name > 0 && body[name..].starts_with(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_prose_is_untouched() {
        assert_eq!(escape_markdown("Hello, world. It's 3 p.m.", true), "Hello, world. It's 3 p.m.");
        assert_eq!(escape_markdown("AT&T and C#", false), "AT&T and C#");
    }

    #[test]
    fn inline_markup_characters_are_escaped() {
        assert_eq!(escape_markdown("1 *not emphasis* here", true), "1 \\*not emphasis\\* here");
        assert_eq!(escape_markdown("snake_case [x] `y` ~z~ a|b", false), "snake\\_case \\[x\\] \\`y\\` \\~z\\~ a\\|b");
        assert_eq!(escape_markdown("<div> \\", false), "\\<div> \\\\");
        assert_eq!(escape_markdown("&amp; &#42; & x", false), "\\&amp; \\&#42; & x");
    }

    #[test]
    fn block_markers_are_escaped_only_at_line_start() {
        assert_eq!(escape_markdown("# not a heading", true), "\\# not a heading");
        assert_eq!(escape_markdown("# mid-line", false), "# mid-line");
        assert_eq!(escape_markdown("- item", true), "\\- item");
        assert_eq!(escape_markdown("> quote", true), "\\> quote");
        assert_eq!(escape_markdown("12. twelve", true), "12\\. twelve");
        assert_eq!(escape_markdown("3) three", true), "3\\) three");
        assert_eq!(escape_markdown("2024 was", true), "2024 was");
    }

    #[test]
    fn every_line_of_multiline_text_is_checked() {
        assert_eq!(escape_markdown("a\n  - b\n1. c", false), "a\n  \\- b\n1\\. c");
    }
}
