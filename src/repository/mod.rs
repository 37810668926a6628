//! Repository layer for database operations
//!
//! Each domain file adds `<domain>_<operation>` methods on [`Repository`].

pub mod carts;
pub mod localisations;
pub mod material_types;
pub mod materiels;
pub mod requests;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
