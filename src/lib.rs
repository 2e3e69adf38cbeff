pub mod app_state;
pub mod auth;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod routing;
pub mod services;
pub mod utils;

#[cfg(test)]
pub mod test_utils;
