pub mod auth;
pub mod commission;
pub mod config;
pub mod db;
pub mod handlers;
pub mod schema;
pub mod service;
pub mod state;
