pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod store;
pub mod web;
