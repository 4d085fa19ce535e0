/// Failures while bringing up or probing the PostgreSQL pool.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("could not connect after {attempts} attempt(s): {source}")]
    ConnectionFailed {
        attempts: u32,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("migrations failed: {0}")]
    Migration(#[source] sea_orm::DbErr),

    #[error("health check failed: {0}")]
    HealthCheck(#[source] sea_orm::DbErr),
}
