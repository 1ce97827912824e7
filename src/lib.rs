// Library exports for Folio
// This allows integration tests and the binary to share the blog core

pub mod auth;
pub mod blog;
pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod storage;
