//! Deterministic analyzer instruction built from a document's text.

/// Number of content characters embedded in a prompt; the rest is dropped.
pub const MAX_PROMPT_CONTENT_CHARS: usize = 10_000;

const INSTRUCTIONS: &str = r#"Analyze the following financial data for an SME.
Provide a JSON response with the following structure:
{
  "metrics": {
    "revenue": number,
    "expenses": number,
    "netProfit": number,
    "cashFlow": number,
    "assets": number,
    "liabilities": number
  },
  "healthScore": number (0-100),
  "risks": ["string", "string"],
  "opportunities": ["string", "string"],
  "recommendations": ["string", "string"],
  "aiNarrative": "markdown string"
}

Data:
"#;

/// Instruction text sent to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    text: String,
    truncated: bool,
}

impl AnalysisPrompt {
    /// Build the prompt, keeping at most [`MAX_PROMPT_CONTENT_CHARS`]
    /// characters of `content`.
    ///
    /// # Examples
    /// ```
    /// use finlens::domain::AnalysisPrompt;
    ///
    /// let prompt = AnalysisPrompt::for_content("Revenue,120000");
    /// assert!(prompt.as_str().ends_with("Revenue,120000"));
    /// assert!(!prompt.was_truncated());
    /// ```
    #[must_use]
    pub fn for_content(content: &str) -> Self {
        let (kept, truncated) = match content.char_indices().nth(MAX_PROMPT_CONTENT_CHARS) {
            Some((cut, _)) => (content.get(..cut).unwrap_or(content), true),
            None => (content, false),
        };
        let mut text = String::with_capacity(INSTRUCTIONS.len() + kept.len());
        text.push_str(INSTRUCTIONS);
        text.push_str(kept);
        Self { text, truncated }
    }

    /// Full instruction text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Whether content was cut to fit.
    #[must_use]
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}
