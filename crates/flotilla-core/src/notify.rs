use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Pipeline event identifiers subscribed to when the caller does not pick
/// its own set. These are the CodeStar notification rule event type ids for
/// pipeline execution outcomes.
pub const DEFAULT_PIPELINE_EVENTS: &[&str] = &[
    "codepipeline-pipeline-pipeline-execution-failed",
    "codepipeline-pipeline-pipeline-execution-succeeded",
];

/// Payload handed to the external notification collaborator: who to mail,
/// and which pipeline events to mail them about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub emails: Vec<String>,
    pub events: Vec<String>,
}

impl NotificationSettings {
    /// Settings with the default pipeline event set.
    pub fn new(emails: Vec<String>) -> CoreResult<Self> {
        Self::with_events(
            emails,
            DEFAULT_PIPELINE_EVENTS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        )
    }

    /// Settings with an explicit event set. An empty email list is valid
    /// (no notifications); an empty event set or a malformed address is not.
    pub fn with_events(emails: Vec<String>, events: Vec<String>) -> CoreResult<Self> {
        if events.is_empty() {
            return Err(CoreError::NotificationError {
                message: "at least one pipeline event is required".to_string(),
            });
        }
        for email in &emails {
            if !email.contains('@') || email.chars().any(char::is_whitespace) {
                return Err(CoreError::NotificationError {
                    message: format!("'{email}' is not a valid email address"),
                });
            }
        }
        Ok(Self { emails, events })
    }
}
