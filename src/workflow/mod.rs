pub mod input;
pub mod question_flow;
pub mod responses;

pub use input::{FinalizeInput, QuestionInput, SubmitMode};
pub use question_flow::{BulkFailure, BulkReport, QuestionFlow};
