pub mod metadata_manager;
pub mod stat_info;
pub mod stat_manager;
pub mod table_manager;
