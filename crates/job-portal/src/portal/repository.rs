/// Error enumeration shared by the job and application stores.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("write conflicts with the stored record")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
