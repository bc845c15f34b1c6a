//! Terminal front end: configuration, the message loop, effect execution and
//! the text render boundary.
mod app;
mod commands;
mod config;
mod effects;
mod render;

pub use app::run_app;
