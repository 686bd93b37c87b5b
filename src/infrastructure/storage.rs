pub mod file_storage;
pub mod local_rate_store;
pub mod memory_storage;
