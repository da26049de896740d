//! Post-processing of raw model output into storable HTML.

use std::sync::LazyLock;

use regex::Regex;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:html?)?\s*").expect("Invalid fence regex"));

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```$").expect("Invalid fence regex"));

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("Invalid title regex"));

/// Normalise raw model output:
///
/// 1. strip a surrounding markdown code fence,
/// 2. drop anything before the first tag,
/// 3. replace curly quotes and apostrophes with straight ones.
///
/// ```
/// use voice_to_post::llm::clean_generated_html;
///
/// let raw = "Sure! Here it is:\n<h1>It\u{2019}s late</h1>";
/// assert_eq!(clean_generated_html(raw), "<h1>It's late</h1>");
/// ```
pub fn clean_generated_html(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = OPENING_FENCE.replace(trimmed, "");
    let unfenced = CLOSING_FENCE.replace(&unfenced, "");

    let body = match unfenced.find('<') {
        Some(idx) => &unfenced[idx..],
        None => &unfenced[..],
    };

    body.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Inner HTML of the first `<h1>`, trimmed, if any.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_code_fence() {
        let raw = "```html\n<h1>T</h1>\n<p>Body</p>\n```";
        assert_eq!(clean_generated_html(raw), "<h1>T</h1>\n<p>Body</p>");
    }

    #[test]
    fn strips_bare_code_fence() {
        let raw = "```\n<p>Body</p>\n```";
        assert_eq!(clean_generated_html(raw), "<p>Body</p>");
    }

    #[test]
    fn strips_preamble_before_first_tag() {
        let raw = "Here is your post:\n\n<h1>T</h1><p>x</p>";
        assert_eq!(clean_generated_html(raw), "<h1>T</h1><p>x</p>");
    }

    #[test]
    fn normalises_curly_quotes() {
        let raw = "<p>\u{201C}Don\u{2019}t,\u{201D} she said. \u{2018}Fine.\u{2019}</p>";
        assert_eq!(
            clean_generated_html(raw),
            "<p>\"Don't,\" she said. 'Fine.'</p>"
        );
    }

    #[test]
    fn text_without_tags_is_kept() {
        assert_eq!(clean_generated_html("  just text  "), "just text");
    }

    #[test]
    fn extracts_first_title() {
        let html = "<h1 class=\"t\"> Morning Light </h1><p>x</p><h1>Second</h1>";
        assert_eq!(extract_title(html).as_deref(), Some("Morning Light"));
    }

    #[test]
    fn title_match_is_case_insensitive() {
        assert_eq!(extract_title("<H1>Loud</H1>").as_deref(), Some("Loud"));
    }

    #[test]
    fn missing_or_empty_title_is_none() {
        assert_eq!(extract_title("<p>no heading</p>"), None);
        assert_eq!(extract_title("<h1>  </h1>"), None);
    }
}
