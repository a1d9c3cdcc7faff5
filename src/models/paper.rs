use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source exam document questions are authored against.
///
/// `used_by` is the claim lock: `None` means available, `Some(maker)`
/// means that maker holds exclusive authoring rights. Mutated only
/// through the claim manager and the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPaper {
    pub id: Uuid,
    pub name: String,
    pub course: Uuid,
    pub subject: String,
    pub standard: String,
    pub syllabus: String,
    pub exam_type: String,
    pub year: String,
    pub number_of_questions: u32,
    /// Opaque reference to the uploaded paper file
    pub question_paper_file: Option<String>,
    /// Opaque reference to the uploaded solution file
    pub solution_paper_file: Option<String>,
    pub used_by: Option<Uuid>,
    /// Derived counter; always equals the number of Approved/Finalised
    /// questions authored against this paper, never exceeds
    /// `number_of_questions`.
    pub approved_question_count: u32,
    pub created_at: DateTime<Utc>,
}

impl QuestionPaper {
    pub fn is_available(&self) -> bool {
        self.used_by.is_none()
    }

    /// An exhausted paper accepts no new questions; existing Draft and
    /// Rejected items may still resolve.
    pub fn is_exhausted(&self) -> bool {
        self.approved_question_count >= self.number_of_questions
    }
}
