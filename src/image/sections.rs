//! Section excerpts: one slice of the post per image position.

use std::sync::LazyLock;

use regex::Regex;

use crate::wizard::{ImagePosition, IMAGES_PER_POST};

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+(?:[.!?]+|$)").expect("Invalid sentence regex"));

/// Strip tags and collapse whitespace.
pub fn plain_text(html: &str) -> String {
    let untagged = TAG.replace_all(html, " ");
    WHITESPACE.replace_all(&untagged, " ").trim().to_string()
}

/// Split `html` into one excerpt per [`ImagePosition`], in document order.
///
/// Sentences are grouped into four contiguous runs. With fewer than four
/// sentences the plain text is cut into four character quarters instead.
/// Positions whose excerpt comes out empty are omitted.
pub fn section_excerpts(html: &str) -> Vec<(ImagePosition, String)> {
    let text = plain_text(html);
    if text.is_empty() {
        return Vec::new();
    }

    let sentences: Vec<&str> = SENTENCE
        .find_iter(&text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    let groups = if sentences.len() >= IMAGES_PER_POST {
        sentence_groups(&sentences)
    } else {
        char_quarters(&text)
    };

    ImagePosition::ALL
        .into_iter()
        .zip(groups)
        .filter(|(_, excerpt)| !excerpt.is_empty())
        .collect()
}

/// Excerpt for a single position, if that section has any text.
pub fn excerpt_for(html: &str, position: ImagePosition) -> Option<String> {
    section_excerpts(html)
        .into_iter()
        .find(|(p, _)| *p == position)
        .map(|(_, excerpt)| excerpt)
}

fn sentence_groups(sentences: &[&str]) -> Vec<String> {
    let n = sentences.len();
    (0..IMAGES_PER_POST)
        .map(|i| {
            let start = i * n / IMAGES_PER_POST;
            let end = (i + 1) * n / IMAGES_PER_POST;
            sentences[start..end].join(" ")
        })
        .collect()
}

fn char_quarters(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = chars.len().div_ceil(IMAGES_PER_POST);
    (0..IMAGES_PER_POST)
        .map(|i| {
            let start = (i * size).min(chars.len());
            let end = ((i + 1) * size).min(chars.len());
            chars[start..end].iter().collect::<String>().trim().to_string()
        })
        .collect()
}
