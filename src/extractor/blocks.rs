//! Test block extraction
//!
//! Shallow lexical scanning of test sources. A block starts at a
//! `test('<title>', async (<param>) => {` declaration and its body runs to
//! the matching closing brace.
//!
//! Known limitations, kept on purpose:
//! - braces inside string literals, template literals and comments are counted
//! - a body whose braces never balance produces no block
//! - other declaration shapes (`it(...)`, non-async or multi-parameter
//!   callbacks, titles built from expressions) are not recognized

use std::sync::OnceLock;

use regex::Regex;

/// A test declaration as found in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub title: String,
    pub body: String,
    /// 1-based line of the declaration
    pub line: usize,
}

fn regex_test_declaration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\btest(?:\.(?:only|skip))?\s*\(\s*(?:'((?:[^'\\\n]|\\.)*)'|"((?:[^"\\\n]|\\.)*)"|`((?:[^`\\]|\\.)*)`)\s*,\s*async\s*(?:\(\s*(?:\{[^{}()]*\}|[A-Za-z_$][\w$]*)\s*\)|[A-Za-z_$][\w$]*)\s*=>\s*\{"#,
        )
        .expect("valid regex literal")
    })
}

/// Extract every recognizable test block from `source`, in source order
pub fn extract_test_blocks(source: &str) -> Vec<RawBlock> {
    let mut blocks = Vec::new();

    for caps in regex_test_declaration().captures_iter(source) {
        let Some(header) = caps.get(0) else {
            continue;
        };
        let Some(title) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };

        let body_start = header.end();
        let Some(body_len) = balanced_body_len(&source[body_start..]) else {
            continue;
        };

        blocks.push(RawBlock {
            title: unescape_title(title.as_str()),
            body: source[body_start..body_start + body_len].to_string(),
            line: source[..header.start()].matches('\n').count() + 1,
        });
    }

    blocks
}

/// Length of the text up to the brace closing an already-open block
fn balanced_body_len(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn unescape_title(raw: &str) -> String {
    raw.replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("\\`", "`")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"import { test, expect } from '@playwright/test';

test.describe('İcra Dosyalarım', () => {
  test('lists files', async ({ page }) => {
    await page.goto('/icra-dosyalarim');
    if (true) { await page.click('#refresh'); }
    await expect(page.locator('table')).toBeVisible();
  });

  test("opens a file's detail", async ({ page, context }) => {
    await page.goto('/icra-dosyalarim/1');
  });

  test.only(`template title`, async (page) => {
    await page.goto('/');
  });
});
"#;

    #[test]
    fn test_extracts_blocks_in_order() {
        let blocks = extract_test_blocks(SPEC);
        let titles: Vec<&str> = blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["lists files", "opens a file's detail", "template title"]);
    }

    #[test]
    fn test_body_spans_nested_braces() {
        let blocks = extract_test_blocks(SPEC);
        let body = &blocks[0].body;
        assert!(body.contains("page.click('#refresh')"));
        assert!(body.contains("toBeVisible()"));
        assert!(!body.contains("opens a file"));
        assert_eq!(blocks[0].line, 4);
    }

    #[test]
    fn test_describe_blocks_are_not_tests() {
        let blocks = extract_test_blocks("test.describe('group', () => { });");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_unterminated_body_yields_nothing() {
        let blocks = extract_test_blocks("test('broken', async ({ page }) => { if (x) {");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_escaped_quote_in_title() {
        let blocks = extract_test_blocks(r#"test('user\'s files', async ({ page }) => { go(); });"#);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "user's files");
        assert_eq!(blocks[0].body.trim(), "go();");
    }

    #[test]
    fn test_non_test_source() {
        assert!(extract_test_blocks("export const x = 1;").is_empty());
        assert!(extract_test_blocks("").is_empty());
    }
}
