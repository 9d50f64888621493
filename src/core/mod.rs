// src/core/mod.rs
//! Front-end side plumbing shared by the flows

pub mod relay_client;

pub use relay_client::{HttpRelay, PublishBody, RelayApi, RelayReply, TokenExchange};
