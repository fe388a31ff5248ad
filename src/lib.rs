pub mod backup;
pub mod config;
pub mod db;
pub mod default_colors;
pub mod export;
pub mod traits;
pub mod types;
pub mod validation;
