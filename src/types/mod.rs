// Clicktrail shared type definitions
// Each submodule defines types used across the application.

pub mod capture;
pub mod errors;
pub mod message;
pub mod settings;
