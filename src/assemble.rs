//! Final HTML assembly: positioned illustrations merged into the edited post.
//!
//! The post is cut into paragraph units on `</p>` boundaries and the four
//! positioned images are placed at fixed proportional boundaries:
//!
//! ```text
//! [header] P1 P2 … P(m1) [middle1] … P(m2) [middle2] … PN [closing]
//!
//! m1 = max(2, ⌊N·0.33⌋)        (1-based, clamped to N)
//! m2 = max(3, ⌊N·0.66⌋)
//! ```
//!
//! Assembly is pure and deterministic; the same inputs always produce the
//! same bytes.

use std::sync::LazyLock;

use regex::Regex;

use crate::wizard::{ImagePosition, SectionImage};

/// Separator between emitted units.
const UNIT_SEPARATOR: &str = "\n\n";

static PARAGRAPH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>").expect("Invalid paragraph regex"));

static PARAGRAPH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p(\s[^>]*)?>").expect("Invalid paragraph regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the publishable HTML for `prose` with `images` interleaved.
///
/// Returns `prose` unchanged when it holds no paragraph at all.  Images at
/// positions that are absent are skipped silently; when the two middle
/// boundaries coincide both images are emitted there, middle1 first.
pub fn assemble(prose: &str, images: &[SectionImage], title: &str) -> String {
    let units = paragraph_units(prose);
    if !units.iter().any(|unit| PARAGRAPH_OPEN.is_match(unit)) {
        return prose.to_string();
    }

    let image_html = |position: ImagePosition| -> Option<String> {
        images
            .iter()
            .find(|img| img.position == position)
            .map(|img| render_image(img, title))
    };

    let header = image_html(ImagePosition::Header);
    let middle1 = image_html(ImagePosition::Middle1);
    let middle2 = image_html(ImagePosition::Middle2);
    let closing = image_html(ImagePosition::Closing);

    let last = units.len() - 1;
    let (after_m1, after_m2) = insertion_indices(units.len());

    let mut out: Vec<String> = Vec::with_capacity(units.len() + images.len());
    for (i, unit) in units.into_iter().enumerate() {
        if i == 0 {
            out.extend(header.clone());
        }
        out.push(unit);
        if i == after_m1 {
            out.extend(middle1.clone());
        }
        if i == after_m2 {
            out.extend(middle2.clone());
        }
        if i == last {
            out.extend(closing.clone());
        }
    }

    out.join(UNIT_SEPARATOR)
}

/// Split `html` into trimmed paragraph-level units.
///
/// Each fragment ending in `</p>` keeps its closing tag.  Blank fragments are
/// dropped, as is any paragraph whose text content is empty.  Trailing
/// non-paragraph content survives as its own unit.
pub fn paragraph_units(html: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut fragments = PARAGRAPH_CLOSE.split(html).peekable();

    while let Some(fragment) = fragments.next() {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            continue;
        }
        let closed = fragments.peek().is_some();
        if PARAGRAPH_OPEN.is_match(trimmed) {
            if !has_text(trimmed) {
                continue;
            }
            if closed {
                units.push(format!("{trimmed}</p>"));
            } else {
                units.push(trimmed.to_string());
            }
        } else {
            units.push(trimmed.to_string());
        }
    }

    units
}

/// 0-based unit indices after which middle1 and middle2 are emitted, for a
/// post of `unit_count` units.  Both are clamped to the last unit.
///
/// ```
/// use voice_to_post::assemble::insertion_indices;
///
/// assert_eq!(insertion_indices(6), (1, 2));
/// assert_eq!(insertion_indices(1), (0, 0));
/// ```
pub fn insertion_indices(unit_count: usize) -> (usize, usize) {
    let last = unit_count.saturating_sub(1);
    let n = unit_count as f64;
    let m1 = ((n * 0.33).floor() as usize).max(2) - 1;
    let m2 = ((n * 0.66).floor() as usize).max(3) - 1;
    (m1.min(last), m2.min(last))
}

/// `<img>` element for one illustration.
pub fn render_image(image: &SectionImage, title: &str) -> String {
    let suffix = image.position.alt_suffix();
    let alt = if title.trim().is_empty() {
        suffix.to_string()
    } else {
        format!("{} - {suffix}", title.trim())
    };
    format!(
        "<img src=\"data:image/png;base64,{}\" alt=\"{}\" style=\"width: 100%; max-width: 800px; height: auto; margin: 24px 0; border-radius: 8px;\" />",
        image.base64,
        escape_attr(&alt)
    )
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn has_text(fragment: &str) -> bool {
    let text = TAG.replace_all(fragment, "");
    !text.replace("&nbsp;", " ").trim().is_empty()
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
