// Clicktrail state managers
// Managers own the stateful roles: the session coordinator, the page overlay and the review popup.

pub mod overlay_agent;
pub mod recording_coordinator;
pub mod review_ui;
