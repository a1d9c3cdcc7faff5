use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Question lifecycle state.
///
/// `Finalised` is terminal; `Approved` is a waiting state for expert
/// pickup. Transitions only move forward along the table enforced in
/// `workflow::QuestionFlow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Finalised,
}

impl QuestionStatus {
    pub fn name(self) -> &'static str {
        match self {
            QuestionStatus::Draft => "Draft",
            QuestionStatus::Pending => "Pending",
            QuestionStatus::Approved => "Approved",
            QuestionStatus::Rejected => "Rejected",
            QuestionStatus::Finalised => "Finalised",
        }
    }
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Easy,
    Medium,
    Hard,
}

/// Text-or-image block used by the stem and the explanation. Images are
/// opaque references to already-uploaded files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Content {
    /// A block is present when it has text or an image.
    pub fn is_present(&self) -> bool {
        !self.text.trim().is_empty() || self.image.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn is_present(&self) -> bool {
        !self.text.trim().is_empty() || self.image.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceImages {
    #[serde(default)]
    pub image1: Option<String>,
    #[serde(default)]
    pub image2: Option<String>,
}

/// The central entity of the workflow.
///
/// Owned by its maker until Approved; edit rights then pass to the
/// expert for finalization. Deleted only while in Draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub question_paper: Uuid,
    pub course: Uuid,
    pub maker: Uuid,
    pub subject: String,
    pub unit: String,
    pub unit_no: Option<u32>,
    pub topic: String,
    pub question_number: u32,
    pub complexity: Option<Complexity>,
    pub keywords: Vec<String>,
    pub frequently_asked: bool,
    pub question: Content,
    pub options: Vec<AnswerOption>,
    pub explanation: Content,
    pub reference: ReferenceImages,
    pub status: QuestionStatus,
    pub checker_comments: Option<String>,
    /// Resubmission response chosen from the fixed set in
    /// `workflow::responses`.
    pub maker_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Number of options flagged correct.
    pub fn correct_option_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    /// Submission gate for entering Pending: stem present, at least two
    /// options each with text or image, exactly one correct option.
    pub fn validate_submission(&self) -> AppResult<()> {
        if !self.question.is_present() {
            return Err(AppError::validation(
                "question",
                "question text or image required",
            ));
        }
        if self.options.len() < 2 {
            return Err(AppError::validation("options", "at least 2 options required"));
        }
        if let Some(pos) = self.options.iter().position(|o| !o.is_present()) {
            return Err(AppError::validation(
                "options",
                format!("option {} needs text or an image", pos + 1),
            ));
        }
        if self.correct_option_count() != 1 {
            return Err(AppError::validation(
                "options",
                "exactly one correct answer required",
            ));
        }
        Ok(())
    }

    /// Finalization gate: full metadata plus non-empty stem and
    /// explanation on top of the submission gate.
    pub fn validate_finalization(&self) -> AppResult<()> {
        self.validate_submission()?;
        if self.unit_no.is_none() {
            return Err(AppError::validation("unit_no", "unit number required"));
        }
        if self.topic.trim().is_empty() {
            return Err(AppError::validation("topic", "topic required"));
        }
        if self.complexity.is_none() {
            return Err(AppError::validation("complexity", "complexity required"));
        }
        if !self.explanation.is_present() {
            return Err(AppError::validation(
                "explanation",
                "explanation text or image required",
            ));
        }
        Ok(())
    }

    /// Digest over the reviewable content (stem, options, explanation).
    ///
    /// Recorded on review events so the aggregator can tell a
    /// no-change resubmission (overturned rejection) from a real fix.
    pub fn content_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.question.text.as_bytes());
        hasher.update(self.question.image.as_deref().unwrap_or("").as_bytes());
        for option in &self.options {
            hasher.update(option.text.as_bytes());
            hasher.update(option.image.as_deref().unwrap_or("").as_bytes());
            hasher.update([option.is_correct as u8]);
        }
        hasher.update(self.explanation.text.as_bytes());
        hasher.update(self.explanation.image.as_deref().unwrap_or("").as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_question() -> Question {
        Question {
            id: Uuid::new_v4(),
            question_paper: Uuid::new_v4(),
            course: Uuid::new_v4(),
            maker: Uuid::new_v4(),
            subject: "Physics".to_string(),
            unit: "Optics".to_string(),
            unit_no: Some(4),
            topic: "Refraction".to_string(),
            question_number: 1,
            complexity: Some(Complexity::Medium),
            keywords: vec!["lens".to_string()],
            frequently_asked: false,
            question: Content {
                text: "What is the focal length?".to_string(),
                image: None,
            },
            options: vec![
                AnswerOption {
                    text: "10 cm".to_string(),
                    image: None,
                    is_correct: true,
                },
                AnswerOption {
                    text: "20 cm".to_string(),
                    image: None,
                    is_correct: false,
                },
            ],
            explanation: Content {
                text: "Apply the lens formula.".to_string(),
                image: None,
            },
            reference: ReferenceImages::default(),
            status: QuestionStatus::Pending,
            checker_comments: None,
            maker_comments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn valid_question_passes_both_gates() {
        let q = valid_question();
        assert!(q.validate_submission().is_ok());
        assert!(q.validate_finalization().is_ok());
    }

    #[test]
    fn submission_requires_exactly_one_correct_option() {
        let mut q = valid_question();
        q.options[1].is_correct = true;
        let err = q.validate_submission().unwrap_err();
        assert_eq!(err.kind(), "validation");

        q.options[0].is_correct = false;
        q.options[1].is_correct = false;
        assert!(q.validate_submission().is_err());
    }

    #[test]
    fn submission_requires_two_present_options() {
        let mut q = valid_question();
        q.options.truncate(1);
        assert!(q.validate_submission().is_err());

        let mut q = valid_question();
        q.options[1].text.clear();
        assert!(q.validate_submission().is_err());

        // an image alone is enough
        let mut q = valid_question();
        q.options[1].text.clear();
        q.options[1].image = Some("uploads/opt-b.png".to_string());
        assert!(q.validate_submission().is_ok());
    }

    #[test]
    fn finalization_requires_full_metadata() {
        let mut q = valid_question();
        q.unit_no = None;
        assert!(q.validate_finalization().is_err());

        let mut q = valid_question();
        q.complexity = None;
        assert!(q.validate_finalization().is_err());

        let mut q = valid_question();
        q.explanation = Content::default();
        assert!(q.validate_finalization().is_err());
    }

    #[test]
    fn fingerprint_tracks_reviewable_content_only() {
        let a = valid_question();
        let mut b = a.clone();
        b.topic = "Reflection".to_string();
        assert_eq!(a.content_fingerprint(), b.content_fingerprint());

        b.options[0].text = "15 cm".to_string();
        assert_ne!(a.content_fingerprint(), b.content_fingerprint());
    }
}
