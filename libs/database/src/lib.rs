//! Database connectivity shared by the API and its domain crates.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL via SeaORM, migrations runner, health checks
//! - `config` (default) - `PostgresConfig: core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "products-api").await?;
//! ```

pub mod retry;

#[cfg(feature = "postgres")]
mod error;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use error::DatabaseError;
pub use retry::Backoff;
