pub mod checkout;
pub mod event;
pub mod money;
pub mod reconcile;
pub mod repository;
pub mod reservation;
pub mod salon;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
    #[error("payment provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error(transparent)]
    Store(#[from] repository::StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;
