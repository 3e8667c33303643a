pub mod block;
pub mod file_manager;
pub mod page;
