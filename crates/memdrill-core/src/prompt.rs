//! Prompt construction for generated drill passages.

use crate::model::{ExerciseType, GenerationRequest, LanguageHint};

const STORY_GUIDANCE: &str = "Create a coherent story with logical flow and context. For example, instead of separate facts like \"A visited X. B visited Y.\", create connected narrative like \"A visited X where they met B, who is from C...\".";

impl GenerationRequest {
    /// Build the request for a drill of the given type and language.
    ///
    /// Blank `extra` instructions are ignored.
    pub fn for_exercise(
        exercise_type: ExerciseType,
        language: LanguageHint,
        extra: Option<&str>,
    ) -> Self {
        let extra = extra.map(str::trim).filter(|e| !e.is_empty());

        let mut prompt = format!(
            "Write 3-4 {} sentences for interpreter memory training about {}:\n{STORY_GUIDANCE}\n",
            language.label(),
            exercise_type.label(),
        );
        if let Some(extra) = extra {
            prompt.push_str(&format!("Additional requirements: {extra}\n"));
        }
        prompt.push_str("Output only the text, no explanations.");

        Self {
            prompt_text: prompt,
            language_hint: language,
            topic_hint: exercise_type.label().to_string(),
            extra_instructions: extra.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_language_and_type() {
        let req = GenerationRequest::for_exercise(
            ExerciseType::Numbers,
            LanguageHint::Korean,
            None,
        );
        assert!(req
            .prompt_text
            .starts_with("Write 3-4 한국어 sentences for interpreter memory training about 숫자 중심:"));
        assert!(req.prompt_text.ends_with("Output only the text, no explanations."));
        assert!(!req.prompt_text.contains("Additional requirements"));
        assert_eq!(req.topic_hint, "숫자 중심");
        assert_eq!(req.language_hint, LanguageHint::Korean);
    }

    #[test]
    fn extra_instructions_are_appended() {
        let req = GenerationRequest::for_exercise(
            ExerciseType::Processes,
            LanguageHint::Chinese,
            Some("  about semiconductor exports "),
        );
        assert!(req
            .prompt_text
            .contains("Additional requirements: about semiconductor exports\n"));
        assert_eq!(
            req.extra_instructions.as_deref(),
            Some("about semiconductor exports")
        );
    }

    #[test]
    fn blank_extra_is_dropped() {
        let req = GenerationRequest::for_exercise(
            ExerciseType::ListsAndOrder,
            LanguageHint::Chinese,
            Some("   "),
        );
        assert!(req.extra_instructions.is_none());
        assert!(!req.prompt_text.contains("Additional requirements"));
    }
}
