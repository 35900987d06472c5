pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod queries;
pub mod routes;
pub mod services;
pub mod store;
pub mod websocket;
