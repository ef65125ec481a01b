//! SafeSphere terminal client.
//!
//! Mirrors the server's friends, friend requests, saved locations and alerts
//! in an in-memory cache and keeps a map of markers reconciled against it.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod markers;
pub mod models;
pub mod notify;
pub mod safety;
pub mod scheduler;
pub mod session;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
