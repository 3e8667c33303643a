pub mod buffer;
pub mod buffer_manager;
