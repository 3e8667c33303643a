pub mod log_iter;
pub mod log_manager;
