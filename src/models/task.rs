use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating a task.
///
/// Any `id` or `userId` in the request body is ignored: both are assigned server-side.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    /// Icon name or URL, up to 200 characters.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub icon: String,
}

/// A task as stored in the `tasks` collection and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: String,
    /// Username of the owner. Fixed at creation.
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl Task {
    /// Creates a new `Task` owned by `owner` with a freshly generated id.
    pub fn new(input: TaskInput, owner: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            title: input.title,
            description: input.description,
            icon: input.icon,
        }
    }
}
