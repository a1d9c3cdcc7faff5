//! Admin catalog - services layer
//!
//! User, course and paper provisioning. Users are soft-disabled rather
//! than deleted, and their role is immutable after creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::{AppError, AppResult};
use crate::models::{Course, CourseStatus, QuestionPaper, Role, User};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub standard: String,
    #[serde(default)]
    pub syllabus: String,
    #[serde(default)]
    pub exam_type: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewPaper {
    pub name: String,
    pub course: Uuid,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub standard: String,
    #[serde(default)]
    pub syllabus: String,
    #[serde(default)]
    pub exam_type: String,
    #[serde(default)]
    pub year: String,
    pub number_of_questions: u32,
    #[serde(default)]
    pub question_paper_file: Option<String>,
    #[serde(default)]
    pub solution_paper_file: Option<String>,
}

pub struct CatalogService {
    store: Arc<Store>,
}

impl CatalogService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, new: NewUser) -> AppResult<User> {
        if new.email.trim().is_empty() || !new.email.contains('@') {
            return Err(AppError::validation("email", "a valid email is required"));
        }
        if new.password.len() < 6 {
            return Err(AppError::validation(
                "password",
                "password must be at least 6 characters",
            ));
        }

        let user = User::new(new.name, new.email, hash_password(&new.password), new.role);
        let mut db = self.store.write().await;
        let user = db.insert_user(user)?;
        info!("✓ created {} account for {}", user.role, user.email);
        Ok(user)
    }

    pub async fn list_users(&self) -> Vec<User> {
        let db = self.store.read().await;
        let mut users: Vec<User> = db.users().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    /// Soft-disable: the account stays referenced by its questions and
    /// ledger history but can no longer log in.
    pub async fn deactivate_user(&self, id: Uuid) -> AppResult<User> {
        let mut db = self.store.write().await;
        let user = db.user_mut(id)?;
        user.is_active = false;
        info!("account {} deactivated", user.email);
        Ok(user.clone())
    }

    pub async fn create_course(&self, admin: &User, new: NewCourse) -> AppResult<Course> {
        if new.title.trim().is_empty() {
            return Err(AppError::validation("title", "course title is required"));
        }
        let course = Course {
            id: Uuid::new_v4(),
            title: new.title,
            standard: new.standard,
            syllabus: new.syllabus,
            exam_type: new.exam_type,
            status: CourseStatus::Active,
            start_date: new.start_date,
            end_date: new.end_date,
            created_by: admin.id,
            created_at: Utc::now(),
        };
        let mut db = self.store.write().await;
        Ok(db.insert_course(course))
    }

    pub async fn list_courses(&self) -> Vec<Course> {
        let db = self.store.read().await;
        let mut courses: Vec<Course> = db.courses().cloned().collect();
        courses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        courses
    }

    pub async fn create_paper(&self, new: NewPaper) -> AppResult<QuestionPaper> {
        if new.number_of_questions == 0 {
            return Err(AppError::validation(
                "number_of_questions",
                "a paper must hold at least one question",
            ));
        }
        let mut db = self.store.write().await;
        db.course(new.course)?;
        let paper = QuestionPaper {
            id: Uuid::new_v4(),
            name: new.name,
            course: new.course,
            subject: new.subject,
            standard: new.standard,
            syllabus: new.syllabus,
            exam_type: new.exam_type,
            year: new.year,
            number_of_questions: new.number_of_questions,
            question_paper_file: new.question_paper_file,
            solution_paper_file: new.solution_paper_file,
            used_by: None,
            approved_question_count: 0,
            created_at: Utc::now(),
        };
        Ok(db.insert_paper(paper))
    }

    pub async fn list_papers(&self) -> Vec<QuestionPaper> {
        let db = self.store.read().await;
        let mut papers: Vec<QuestionPaper> = db.papers().cloned().collect();
        papers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        papers
    }
}
