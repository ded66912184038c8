use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Maximum title length, counted in characters after trimming.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum description length, counted in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,
    /// Identifier of the user who owns the task.
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be non-blank and at most 200 characters once trimmed.
    #[validate(custom = "validate_title")]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// A validated, normalized task ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl From<TaskInput> for NewTask {
    fn from(input: TaskInput) -> Self {
        Self {
            title: input.title.trim().to_string(),
            description: input.description,
        }
    }
}

/// Partial update of a task. Fields left out (or sent as `null`) keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(custom = "validate_title")]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

impl Task {
    /// Applies the supplied fields of `patch` and refreshes `updated_at`.
    /// The patch must already have passed validation.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.touch();
    }

    pub fn toggle_completion(&mut self) {
        self.completed = !self.completed;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }
}

/// Current time at the precision the database keeps (microseconds).
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly after `previous`, even if the clock has not advanced
/// past it (or has stepped backwards).
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = timestamp_now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("title must not be blank".into());
        return Err(error);
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let mut error = ValidationError::new("length");
        error.message = Some("title must be at most 200 characters".into());
        return Err(error);
    }
    Ok(())
}
