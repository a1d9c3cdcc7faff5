pub mod course;
pub mod event;
pub mod paper;
pub mod question;
pub mod role;
pub mod user;
pub mod wallet;

pub use course::{Course, CourseStatus};
pub use event::{ReviewAction, ReviewEvent};
pub use paper::QuestionPaper;
pub use question::{AnswerOption, Complexity, Content, Question, QuestionStatus, ReferenceImages};
pub use role::{Capability, Role};
pub use user::User;
pub use wallet::{TransactionKind, WalletTransaction};
