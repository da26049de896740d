//! Prompt builder for blog-post generation.
//!
//! [`PromptBuilder`] produces the `(system_msg, user_msg)` pair sent to an
//! OpenAI-compatible `/v1/chat/completions` endpoint.  The system message is
//! a style/persona document; the user message wraps the transcript with the
//! output-format requirements the cleanup step relies on (one `<h1>`, short
//! `<p>` paragraphs, straight quotes).

// ---------------------------------------------------------------------------
// Style guide
// ---------------------------------------------------------------------------

/// Default persona: reflective first-person essays.
const DEFAULT_STYLE_GUIDE: &str = "\
You are a ghostwriter turning spoken voice notes into personal blog posts.

Voice:
- First person, conversational but thoughtful.
- Reflective rather than prescriptive; share what was learned, do not lecture.
- Warm and sincere; no hype, no sales language, no cynicism.
- Concrete moments and observations over abstractions.

Avoid:
- Clichés such as \"in today's fast-paced world\", \"delve\", \"game-changer\".
- Lists and headings inside the body.
- Inventing facts that are not in the voice note.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds blog-generation prompts in chat-message format.
///
/// # Example
/// ```rust
/// use voice_to_post::llm::PromptBuilder;
///
/// let builder = PromptBuilder::default();
/// let (system, user) = builder.build_chat("I went for a walk this morning");
/// assert!(system.contains("ghostwriter"));
/// assert!(user.contains("I went for a walk this morning"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    style_guide: String,
}

impl PromptBuilder {
    /// Create a builder with a custom style/persona document.
    pub fn new(style_guide: impl Into<String>) -> Self {
        Self {
            style_guide: style_guide.into(),
        }
    }

    /// Build a **(system_msg, user_msg)** pair.
    pub fn build_chat(&self, transcript: &str) -> (String, String) {
        let system_msg = self.style_guide.clone();

        let mut user_msg = String::with_capacity(transcript.len() + 1024);
        user_msg.push_str(
            "Transform this voice note transcription into a blog post:\n\n---\n",
        );
        user_msg.push_str(transcript.trim());
        user_msg.push_str("\n---\n\n");
        user_msg.push_str(OUTPUT_REQUIREMENTS);

        (system_msg, user_msg)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_GUIDE)
    }
}

const OUTPUT_REQUIREMENTS: &str = "\
Requirements:
- Create a short, evocative title (not clickbait).
- Write 400-800 words.
- Use short paragraphs (2-4 sentences each); each distinct thought is its own paragraph.
- Use straight quotes (\") and straight apostrophes ('), never curly ones.
- Use <strong> and <em> sparingly for emphasis.

Output format:
- Return ONLY HTML, no markdown and no code fences.
- Start with the title in a single <h1> element.
- Follow with the body as <p> elements only.";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_wraps_trimmed_transcript() {
        let (_, user) = PromptBuilder::default().build_chat("  a thought  \n");
        assert!(user.contains("---\na thought\n---"));
    }

    #[test]
    fn user_message_demands_html_shape() {
        let (_, user) = PromptBuilder::default().build_chat("x");
        assert!(user.contains("<h1>"));
        assert!(user.contains("<p>"));
        assert!(user.contains("no code fences"));
    }

    #[test]
    fn custom_style_guide_becomes_system_message() {
        let builder = PromptBuilder::new("Write like a pirate.");
        let (system, _) = builder.build_chat("ahoy");
        assert_eq!(system, "Write like a pirate.");
    }
}
