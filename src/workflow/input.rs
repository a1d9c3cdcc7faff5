use serde::Deserialize;
use uuid::Uuid;

use crate::models::question::{AnswerOption, Complexity, Content, ReferenceImages};

/// Whether the maker is saving a work-in-progress draft or submitting
/// for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    Draft,
    Pending,
}

/// Maker-supplied question content. Everything except the paper and
/// course references may be partial while drafting; the submission
/// gate applies when entering Pending.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionInput {
    pub question_paper: Uuid,
    pub course: Uuid,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_no: Option<u32>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub question_number: u32,
    #[serde(default)]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub frequently_asked: bool,
    #[serde(default)]
    pub question: Content,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub explanation: Content,
    #[serde(default)]
    pub reference: ReferenceImages,
}

/// Expert-supplied metadata applied during finalization. Fields left
/// out keep whatever the maker already provided.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalizeInput {
    #[serde(default)]
    pub unit_no: Option<u32>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub explanation: Option<Content>,
}
