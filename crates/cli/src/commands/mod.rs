pub mod actions;
pub mod ask;
pub mod config_cmd;
