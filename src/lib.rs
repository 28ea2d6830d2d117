pub mod api;
pub mod booking;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod map;
pub mod models;
pub mod observability;
pub mod state;
