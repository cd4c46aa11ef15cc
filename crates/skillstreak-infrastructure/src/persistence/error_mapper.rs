use skillstreak_domain::shared::DomainError;

/// SQLite result codes that mean another connection holds the lock.
/// 5 SQLITE_BUSY, 6 SQLITE_LOCKED, 261 BUSY_RECOVERY, 262 LOCKED_SHAREDCACHE,
/// 517 BUSY_SNAPSHOT, 773 BUSY_TIMEOUT
const BUSY_CODES: [&str; 6] = ["5", "6", "261", "262", "517", "773"];

/// 19 SQLITE_CONSTRAINT and its extended codes
/// (CHECK, FOREIGNKEY, NOTNULL, PRIMARYKEY, UNIQUE)
const CONSTRAINT_CODES: [&str; 6] = ["19", "275", "787", "1299", "1555", "2067"];

/// Whether the error is lock contention rather than a real failure
pub fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| BUSY_CODES.contains(&&*code))
            .unwrap_or(false),
        _ => false,
    }
}

fn is_constraint_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| CONSTRAINT_CODES.contains(&&*code))
            .unwrap_or(false),
        _ => false,
    }
}

/// Translates sqlx errors into domain errors
pub struct RepositoryErrorMapper;

impl RepositoryErrorMapper {
    pub fn map_sqlx_error(err: sqlx::Error, context: &str) -> DomainError {
        if is_busy(&err) {
            return DomainError::Conflict(format!("{}: {}", context, err));
        }
        if is_constraint_violation(&err) {
            return DomainError::DataIntegrity(format!("{}: {}", context, err));
        }

        match err {
            sqlx::Error::RowNotFound => DomainError::NotFound(context.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DomainError::Deserialization(format!("{}: {}", context, err))
            }
            other => DomainError::Repository(format!("{}: {}", context, other)),
        }
    }
}

/// Extension trait for sqlx results
pub trait ResultExt<T> {
    /// Map the error through `RepositoryErrorMapper` with a short description
    /// of the operation, e.g. `"Load streak"`
    fn map_repo_error(self, context: &str) -> Result<T, DomainError>;
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = RepositoryErrorMapper::map_sqlx_error(sqlx::Error::RowNotFound, "Load streak");
        assert!(matches!(err, DomainError::NotFound(ctx) if ctx == "Load streak"));
    }

    #[test]
    fn test_other_errors_map_to_repository() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::PoolClosed);
        let err = result.map_repo_error("Save streak").unwrap_err();
        assert!(matches!(err, DomainError::Repository(msg) if msg.starts_with("Save streak")));
        assert!(!is_busy(&sqlx::Error::PoolClosed));
    }
}
