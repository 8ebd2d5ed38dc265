pub const CONTEXT_LABEL: &str = "Context for better translation: ";
pub const SENTENCE_LABEL: &str = "Sentence to be translated: ";

/// Instruction sent as the system message, before the configured suffix
pub fn system_instruction(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional translator who translates subtitles from {} into {}. \
         The translation should be natural and fluent, while preserving the original meaning and style. \
         Do not use formatting, code markup, or quotation marks in the translation. \
         If there are choices, choose one and only return this. \
         Do not explain the choice or ask questions.",
        source_language, target_language
    )
}

/// Everything needed for one backend call
#[derive(Debug, Clone)]
pub struct TranslationRequest<'a> {
    pub source_language: &'a str,
    pub target_language: &'a str,
    /// Appended verbatim to the system instruction
    pub system_suffix: &'a str,
    /// Labeled neighbouring captions, see [`super::build_context`]
    pub context: String,
    pub sentence: &'a str,
}

impl TranslationRequest<'_> {
    pub fn system_message(&self) -> String {
        format!(
            "{}{}\n\n{}\n{}\n",
            system_instruction(self.source_language, self.target_language),
            self.system_suffix,
            CONTEXT_LABEL,
            self.context
        )
    }

    pub fn user_message(&self) -> String {
        format!("{}{}", SENTENCE_LABEL, self.sentence)
    }
}
