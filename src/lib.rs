//! LinkedIn connect-and-publish: a Rocket relay that keeps the OAuth client
//! secret off the browser, plus the front-end flows and credential store that
//! talk to it.

pub mod cli;
pub mod core;
pub mod environment;
pub mod flows;
pub mod linkedin;
pub mod store;
pub mod web;

pub use environment::AppConfig;
pub use web::{build_rocket, start_web_server};
