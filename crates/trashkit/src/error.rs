use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrashError {
    #[error("Record {id} is already in the trash")]
    AlreadyDeleted { id: String },

    #[error("Record {id} is not in the trash")]
    NotDeleted { id: String },

    #[error("Record {id} has inconsistent deletion state (is_deleted and deleted_at disagree)")]
    CorruptRecordState { id: String },

    #[error("Collection '{kind}' is unavailable: {reason}")]
    CollectionUnavailable { kind: String, reason: String },

    #[error("{kind} record {id} not found")]
    RecordNotFound { kind: String, id: String },

    #[error("A collection of kind '{0}' is already registered")]
    DuplicateKind(String),

    #[error("Invalid collection kind '{0}': kind labels must not be blank")]
    InvalidKind(String),

    #[error("{kind} record {id} kept changing, gave up after {attempts} attempts")]
    Contention {
        kind: String,
        id: String,
        attempts: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrashError {
    pub fn unavailable(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        TrashError::CollectionUnavailable {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Errors that usually mean the caller acted on a stale view (double click,
    /// concurrent edit). UIs should report these as a notice, not a failure.
    pub fn is_stale_state(&self) -> bool {
        matches!(
            self,
            TrashError::AlreadyDeleted { .. } | TrashError::NotDeleted { .. }
        )
    }
}

impl From<confique::Error> for TrashError {
    fn from(err: confique::Error) -> Self {
        TrashError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_state_classification() {
        let already = TrashError::AlreadyDeleted { id: "n1".into() };
        let not_deleted = TrashError::NotDeleted { id: "n1".into() };
        let corrupt = TrashError::CorruptRecordState { id: "n1".into() };

        assert!(already.is_stale_state());
        assert!(not_deleted.is_stale_state());
        assert!(!corrupt.is_stale_state());
        assert!(!TrashError::unavailable("news", "down").is_stale_state());
    }

    #[test]
    fn messages_name_the_kind_and_id() {
        let err = TrashError::NotDeleted { id: "s-42".into() };
        assert_eq!(err.to_string(), "Record s-42 is not in the trash");

        let err = TrashError::RecordNotFound {
            kind: "service".into(),
            id: "s-42".into(),
        };
        assert_eq!(err.to_string(), "service record s-42 not found");

        let err = TrashError::Contention {
            kind: "project".into(),
            id: "p-7".into(),
            attempts: 8,
        };
        assert_eq!(
            err.to_string(),
            "project record p-7 kept changing, gave up after 8 attempts"
        );
        assert!(!err.is_stale_state());

        let err = TrashError::unavailable("client", "connection refused");
        assert!(err.to_string().contains("'client'"));
        assert!(err.to_string().contains("connection refused"));
    }
}
