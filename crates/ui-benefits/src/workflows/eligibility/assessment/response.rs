use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentCategory {
    MostLikely,
    Likely,
    Unlikely,
    Uncertain,
}

/// Validated qualitative judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub assessment: AssessmentCategory,
    pub confidence_score: f64,
    pub risk_factors: Vec<String>,
    pub reasoning_summary: String,
    pub key_citations: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("assessment response was empty")]
    Empty,
    #[error("assessment response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("confidence score {0} is outside 0..=100")]
    ConfidenceOutOfRange(f64),
}

impl AssessmentResult {
    /// Parses a raw collaborator response, tolerating a surrounding markdown
    /// code fence.
    pub fn parse(raw: &str) -> Result<Self, AssessmentError> {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(AssessmentError::Empty);
        }

        let result: AssessmentResult = serde_json::from_str(body)?;
        if !result.confidence_score.is_finite()
            || !(0.0..=100.0).contains(&result.confidence_score)
        {
            return Err(AssessmentError::ConfidenceOutOfRange(result.confidence_score));
        }
        Ok(result)
    }

    /// Drops citations that do not name one of the supplied section ids and
    /// returns the removed ones.
    pub fn retain_known_citations<'a, I>(&mut self, known: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: Vec<&str> = known.into_iter().collect();
        let (kept, dropped): (Vec<String>, Vec<String>) = std::mem::take(&mut self.key_citations)
            .into_iter()
            .partition(|citation| known.contains(&citation.as_str()));
        self.key_citations = kept;
        dropped
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[start + 3..];
    let after_lang = after_open
        .strip_prefix("json")
        .or_else(|| after_open.strip_prefix("JSON"))
        .unwrap_or(after_open);
    match after_lang.find("```") {
        Some(end) => after_lang[..end].trim(),
        None => trimmed,
    }
}
