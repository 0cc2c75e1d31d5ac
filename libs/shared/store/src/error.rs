use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record conflicts with existing state")]
    Conflict,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
