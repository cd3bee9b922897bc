//! Adapters - Implementations of port interfaces.
//!
//! - `storage` - session store backends (in-memory, Redis)
//! - `generation` - generation capability clients (HTTP, mock, retrying
//!   decorator)

pub mod generation;
pub mod storage;

pub use generation::{HttpGenerator, HttpGeneratorConfig, MockGenerator, RetryPolicy, RetryingGenerator};
pub use storage::{InMemorySessionStore, RedisSessionStore};
