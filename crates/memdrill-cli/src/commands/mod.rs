pub mod drill;
pub mod generate;
pub mod init;
pub mod keywords;
pub mod list_models;
