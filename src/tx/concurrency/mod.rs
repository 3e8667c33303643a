pub mod concurrency_manager;
pub mod lock_table;
