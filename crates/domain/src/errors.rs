use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid record value: {0}")]
    InvalidRecordValue(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
