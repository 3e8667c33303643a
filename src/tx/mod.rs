pub mod buffer_list;
pub mod concurrency;
pub mod recovery;
pub mod transaction;
