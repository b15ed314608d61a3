//! Directive processor – expands `@` placeholders in HTML before it is sent
//! to the rendering backend.
//!
//! | Directive               | Expansion                              |
//! |-------------------------|----------------------------------------|
//! | `@pageNumber`           | [`PAGE_NUMBER`]                        |
//! | `@totalPages`           | [`TOTAL_PAGES`]                        |
//! | `@pageBreak`            | [`PAGE_BREAK`]                         |
//! | `@inlinedImage('path')` | markup from [`ImageInliner`]           |
//!
//! The scan is a single left-to-right pass, so directive text that appears
//! inside an `@inlinedImage` argument is never expanded.

use crate::inliner::ImageInliner;

/// Current page number, filled in by the browser's header/footer template.
pub const PAGE_NUMBER: &str = r#"<span class="pageNumber"></span>"#;

/// Total page count, filled in by the browser's header/footer template.
pub const TOTAL_PAGES: &str = r#"<span class="totalPages"></span>"#;

/// Forces a page break after this point.
pub const PAGE_BREAK: &str = r#"<div style="page-break-after: always;"></div>"#;

const INLINED_IMAGE: &str = "@inlinedImage(";

const LITERALS: [(&str, &str); 3] = [
    ("@pageNumber", PAGE_NUMBER),
    ("@totalPages", TOTAL_PAGES),
    ("@pageBreak", PAGE_BREAK),
];

/// A directive recognised at some position.
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Literal { len: usize, expansion: &'static str },
    Image { len: usize, path: &'a str },
}

/// Expand every directive in `html`. Text that is not a well-formed directive
/// is copied through unchanged.
pub fn process(html: &str, images: &ImageInliner<'_>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let candidate = &rest[at..];

        match match_token(candidate) {
            Some(Token::Literal { len, expansion }) => {
                out.push_str(expansion);
                rest = &candidate[len..];
            }
            Some(Token::Image { len, path }) => {
                out.push_str(&images.inline_markup(path));
                rest = &candidate[len..];
            }
            None => {
                out.push('@');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Match a directive at the start of `s` (which begins with `@`).
fn match_token(s: &str) -> Option<Token<'_>> {
    if let Some(args) = s.strip_prefix(INLINED_IMAGE) {
        return match_image_argument(args)
            .map(|(path, arg_len)| Token::Image { len: INLINED_IMAGE.len() + arg_len, path });
    }

    LITERALS
        .iter()
        .find(|(token, _)| s.starts_with(token))
        .map(|&(token, expansion)| Token::Literal { len: token.len(), expansion })
}

/// Parse `'path')` or `"path")` at the start of `args`.
///
/// The path is at least one character, stays on one line, and ends at the
/// first quote (of either kind) that is directly followed by `)`. Returns the
/// path and the number of bytes consumed including the closing `)`.
fn match_image_argument(args: &str) -> Option<(&str, usize)> {
    let mut chars = args.char_indices();
    let (_, open) = chars.next()?;
    if !is_quote(open) {
        return None;
    }
    let start = open.len_utf8();

    // Skip the first path character so the path is never empty.
    let (_, first) = chars.next()?;
    if first == '\n' {
        return None;
    }

    for (i, c) in chars {
        if c == '\n' {
            return None;
        }
        if is_quote(c) && args[i + 1..].starts_with(')') {
            return Some((&args[start..i], i + 2));
        }
    }
    None
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn run(html: &str) -> String {
        let store = MemoryStore::new();
        process(html, &ImageInliner::new(&store))
    }

    #[test]
    fn page_number() {
        assert_eq!(run("<p>Page @pageNumber</p>"), format!("<p>Page {PAGE_NUMBER}</p>"));
    }

    #[test]
    fn total_pages() {
        assert_eq!(run("<p>Total: @totalPages</p>"), format!("<p>Total: {TOTAL_PAGES}</p>"));
    }

    #[test]
    fn page_break() {
        assert_eq!(
            run("<p>Before</p>@pageBreak<p>After</p>"),
            format!("<p>Before</p>{PAGE_BREAK}<p>After</p>")
        );
    }

    #[test]
    fn many_occurrences() {
        assert_eq!(
            run("@pageNumber / @totalPages @pageNumber"),
            format!("{PAGE_NUMBER} / {TOTAL_PAGES} {PAGE_NUMBER}")
        );
    }

    #[test]
    fn unrelated_html_untouched() {
        let html = r#"<a href="mailto:team@example.com">@mention</a> @ 5 @@"#;
        assert_eq!(run(html), html);
        assert_eq!(run(""), "");
        assert_eq!(run("@"), "@");
    }

    #[test]
    fn inlined_image_url_both_quotes() {
        let single = run("<div>@inlinedImage('https://example.com/logo.png')</div>");
        let double = run(r#"<div>@inlinedImage("https://example.com/logo.png")</div>"#);
        let expected = r#"<div><img src="https://example.com/logo.png" /></div>"#;
        assert_eq!(single, expected);
        assert_eq!(double, expected);
    }

    #[test]
    fn inlined_image_from_storage() {
        let store = MemoryStore::new();
        store.insert_with_mime("logo.jpg", vec![1, 2, 3], "image/jpeg");
        let out = process("@inlinedImage('logo.jpg')", &ImageInliner::new(&store));
        assert_eq!(out, r#"<img src="data:image/jpeg;base64,AQID" />"#);
    }

    #[test]
    fn missing_image_expands_to_nothing() {
        assert_eq!(run("<p>@inlinedImage('missing.png')</p>"), "<p></p>");
    }

    #[test]
    fn malformed_image_directives_are_kept() {
        for html in [
            "@inlinedImage()",
            "@inlinedImage('')",
            "@inlinedImage(logo.png)",
            "@inlinedImage('logo.png'",
            "@inlinedImage('multi\nline.png')",
        ] {
            assert_eq!(run(html), html, "{html:?}");
        }
    }

    #[test]
    fn argument_ends_at_first_quote_paren() {
        let store = MemoryStore::new();
        store.insert_with_mime("a.png", vec![0], "image/png");
        let out = process("@inlinedImage('a.png') and ')", &ImageInliner::new(&store));
        assert_eq!(out, r#"<img src="data:image/png;base64,AA==" /> and ')"#);
    }

    #[test]
    fn directives_inside_image_path_are_not_expanded() {
        let out = run("@inlinedImage('https://x.com/@pageNumber.png')");
        assert_eq!(out, r#"<img src="https://x.com/@pageNumber.png" />"#);
    }

    #[test]
    fn prefix_matches_like_plain_replacement() {
        assert_eq!(run("@pageNumbers"), format!("{PAGE_NUMBER}s"));
    }

    #[test]
    fn non_ascii_content_is_preserved() {
        assert_eq!(run("Seite @pageNumber – Übersicht"), format!("Seite {PAGE_NUMBER} – Übersicht"));
    }
}
