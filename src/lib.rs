// src/lib.rs

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod utils;

pub use routes::create_router;
