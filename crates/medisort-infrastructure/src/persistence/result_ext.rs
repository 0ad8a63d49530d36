use medisort_domain::shared::DomainError;

/// Extension trait for Result types to simplify error handling
pub trait ResultExt<T> {
    /// Convert error to DomainError::Infrastructure
    /// Usage: `result.to_infra_err()?`
    fn to_infra_err(self) -> Result<T, DomainError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn to_infra_err(self) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Infrastructure(e.to_string()))
    }
}

/// Map a sqlx error to a domain error, tagged with the operation name
pub trait RepoResultExt<T> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError>;
}

impl<T> RepoResultExt<T> for Result<T, sqlx::Error> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| map_sqlx_error(e, context))
    }
}

pub(crate) fn map_sqlx_error(error: sqlx::Error, context: &str) -> DomainError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::DataIntegrity(format!("{}: duplicate key: {}", context, db.message()))
        }
        sqlx::Error::Database(db) if db.is_check_violation() => {
            DomainError::DataIntegrity(format!("{}: constraint failed: {}", context, db.message()))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            DomainError::DataIntegrity(format!("{}: {}", context, error))
        }
        _ => DomainError::Repository(format!("{}: {}", context, error)),
    }
}
