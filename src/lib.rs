//! Clicktrail: records the clicks made on a page as screenshots and turns
//! the reviewed session into an annotated PDF.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
