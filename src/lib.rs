pub mod api;
pub mod auth;
pub mod configuration;
pub mod db;
pub mod entity;
pub mod history;
pub mod migration;
pub mod model;
pub mod partner;
pub mod telemetry;
pub mod util;

#[cfg(test)]
mod test_support;
