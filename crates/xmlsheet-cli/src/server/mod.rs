//! Local JSON HTTP API over a single catalog.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
