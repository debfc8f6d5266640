// Clicktrail services
// Services provide core functionality: messaging, screenshots, PDF export and settings.

pub mod message_bus;
pub mod pdf_exporter;
pub mod screenshot_source;
pub mod settings_engine;
