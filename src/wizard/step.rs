//! The six ordered wizard stages.

/// One of the six wizard stages, in order.
///
/// ```text
/// Voice ─▶ Transcribe ─▶ Generate ─▶ Edit ─▶ Illustrate ─▶ Output
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    /// Record or upload a voice note (or a plain-text file).
    #[default]
    Voice,
    /// Speech-to-text; the transcript is editable afterwards.
    Transcribe,
    /// Transcript → styled HTML blog post.
    Generate,
    /// User edits the generated post and its title.
    Edit,
    /// Four positioned illustrations are generated.
    Illustrate,
    /// Final HTML is assembled and exported.
    Output,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Voice,
        WizardStep::Transcribe,
        WizardStep::Generate,
        WizardStep::Edit,
        WizardStep::Illustrate,
        WizardStep::Output,
    ];

    /// The first step of every session.
    pub const FIRST: WizardStep = WizardStep::Voice;

    /// 1-based position, as shown in the stepper.
    ///
    /// ```
    /// use voice_to_post::wizard::WizardStep;
    ///
    /// assert_eq!(WizardStep::Voice.index(), 1);
    /// assert_eq!(WizardStep::Output.index(), 6);
    /// ```
    pub fn index(self) -> usize {
        self as usize + 1
    }

    /// Step with the given 1-based position.
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The following step, or `None` on [`WizardStep::Output`].
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, or `None` on [`WizardStep::Voice`].
    pub fn prev(self) -> Option<Self> {
        Self::from_index(self.index() - 1)
    }

    /// Short label for the stepper.
    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Voice => "Voice",
            WizardStep::Transcribe => "Transcribe",
            WizardStep::Generate => "Generate",
            WizardStep::Edit => "Edit",
            WizardStep::Illustrate => "Images",
            WizardStep::Output => "Output",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
