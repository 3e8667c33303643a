use std::mem::size_of;

pub mod buffer;
pub mod error;
pub mod file;
pub mod log;
pub mod macros;
pub mod metadata;
pub mod plan;
pub mod query;
pub mod record;
pub mod server;
pub mod tx;

pub const LOG_FILE: &str = "tinyrel.log";

const I32_SIZE: usize = size_of::<i32>();
