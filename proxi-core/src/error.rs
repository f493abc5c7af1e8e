use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failure of a single storage call. The display text is what callers see.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Constraint(String),
    #[error("{0}")]
    Query(DieselError),
    #[error("failed to get database connection: {0}")]
    Pool(String),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation),
                info,
            ) => {
                tracing::debug!("constraint violation ({:?}) on {:?}", kind, info.table_name());
                StoreError::Constraint(info.message().to_string())
            }
            other => StoreError::Query(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
