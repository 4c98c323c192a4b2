pub mod client;
pub mod form;
pub mod parse;
pub mod render;
pub mod service;
pub mod steps;
pub mod types;

pub use service::{AppState, build_advisor_flow, create_app, init_tracing};
