//! Tequmsa relay — update inbox/outbox over HTTP, websocket fan-out, engine endpoints

pub mod auth;
pub mod client;
pub mod server;
pub mod state;
pub mod ws;

pub use auth::ResolvedAuth;
pub use client::{ClientError, SyncClient};
pub use server::{app, serve, serve_listener};
pub use state::RelayState;
