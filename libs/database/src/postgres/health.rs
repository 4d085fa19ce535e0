use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, SqlErr, Statement};
use tracing::debug;

use crate::DatabaseError;

/// Run `SELECT 1` against the pool; used by the readiness endpoint.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(DatabaseError::HealthCheck)?;

    debug!("PostgreSQL health check passed");
    Ok(())
}

/// Whether `err` was raised by a UNIQUE constraint.
///
/// Repositories use this to turn races past their own existence checks into
/// the same domain error as the check itself.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&DbErr::RecordNotFound("products".into())));
        assert!(!is_unique_violation(&DbErr::Custom("boom".into())));
    }
}
