//! Standings, fixture generation and rating engine for a doubles league.
//!
//! The crate is split the usual way:
//! - `models`: rows as they live in Postgres
//! - `dto`: request/response payloads used by the HTTP layer
//! - `repository`: sqlx queries, one repository per aggregate
//! - `services`: the engine itself (pure computations) and the transactional
//!   orchestration that feeds it from the database

pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::Result;

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
