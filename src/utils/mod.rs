pub mod app_config;
pub mod decimal;
pub mod retry;
