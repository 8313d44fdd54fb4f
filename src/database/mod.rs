pub mod memory_store;
pub mod pg_store;
pub mod pool;
pub mod seed;
pub mod store;
