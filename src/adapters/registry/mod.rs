//! Connection registry adapters.
//!
//! ## Available Adapters
//!
//! - `InMemoryConnectionRegistry` - In-memory for testing and single-node
//! - `RedisConnectionRegistry` - Redis hash for multi-node deployments
//! - `PostgresConnectionRegistry` - PostgreSQL table for durable storage

mod in_memory;
mod postgres;
mod redis;

pub use self::redis::RedisConnectionRegistry;
pub use in_memory::InMemoryConnectionRegistry;
pub use postgres::{validate_table_name, PostgresConnectionRegistry};
