//! Shared error types and utilities for the mergington project.
pub use color_eyre::Report;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to install color_eyre")]
    ColorEyre(#[from] color_eyre::Report),
    #[error("Failed to install tracing-subscriber")]
    TracingSubscriber(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of a [`RosterError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
}

/// Reasons an enroll or withdraw request is rejected.
///
/// The `Display` text is the human-readable detail returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Activity not found")]
    ActivityNotFound { activity: String },
    #[error("Participant not found")]
    ParticipantNotFound { activity: String, email: String },
    #[error("Student {email} is already signed up for {activity}")]
    AlreadySignedUp { activity: String, email: String },
    #[error("Student {email} is already signed up for {enrolled_in}")]
    EnrolledElsewhere {
        activity: String,
        email: String,
        enrolled_in: String,
    },
    #[error("Activity is full")]
    ActivityFull { activity: String, capacity: usize },
}

impl RosterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ActivityNotFound { .. } | Self::ParticipantNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::AlreadySignedUp { .. }
            | Self::EnrolledElsewhere { .. }
            | Self::ActivityFull { .. } => ErrorKind::Conflict,
        }
    }

    /// Name of the activity the rejected request targeted.
    pub fn activity(&self) -> &str {
        match self {
            Self::ActivityNotFound { activity }
            | Self::ParticipantNotFound { activity, .. }
            | Self::AlreadySignedUp { activity, .. }
            | Self::EnrolledElsewhere { activity, .. }
            | Self::ActivityFull { activity, .. } => activity.as_str(),
        }
    }
}

/// Problems found while loading or validating an activity catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Activity {0} is listed more than once")]
    DuplicateActivity(String),
    #[error("Activity {activity} lists {email} more than once")]
    DuplicateParticipant { activity: String, email: String },
}
