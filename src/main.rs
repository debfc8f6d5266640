//! Clicktrail demo: records page clicks as screenshots and exports them as PDF.
//!
//! Entry point: runs a demo session against a synthetic screenshot source:
//! three clicks, one page deleted, one annotated, PDF written to the export
//! directory.

use std::sync::Arc;

use clicktrail::app::App;
use clicktrail::logging;
use clicktrail::managers::overlay_agent::{OverlayAgent, PageClick};
use clicktrail::rpc_handler::handle_message;
use clicktrail::services::screenshot_source::SyntheticSource;
use clicktrail::types::message::OverlayNotification;
use serde_json::json;
use tokio::sync::broadcast::Receiver;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

/// Applies every notification already queued for the overlay.
async fn drain(
    overlay: &mut OverlayAgent,
    notifications: &mut Receiver<OverlayNotification>,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Ok(notification) = notifications.try_recv() {
        overlay.handle_notification(notification).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging("info");

    let app = App::new(None, Arc::new(SyntheticSource::new(1280, 720)))?;
    let mut overlay_rx = app.overlays.subscribe();
    let mut review_rx = app.review.subscribe();
    let mut overlay = app.overlay_agent();
    let mut ui = app.review_ui();

    section("Recording");
    ui.start_recording().await?;
    drain(&mut overlay, &mut overlay_rx).await?;
    println!("  Overlay visible: {}, button: {:?}", overlay.is_visible(), overlay.displayed_button());

    for (x, y) in [(10.0, 20.0), (30.0, 40.0), (50.0, 60.0)] {
        if let Some(result) = overlay.handle_click(PageClick::on_page(x, y)).await {
            let capture = result?;
            println!("  Captured click at ({}, {}): {} bytes", capture.click_x, capture.click_y, capture.image.bytes.len());
        }
    }
    let state = handle_message(&app.coordinator, &json!({"action": "getRecordingState"})).await?;
    println!("  Bridge state: {}", state);

    section("Review");
    let handed_over = overlay.stop_recording().await?;
    ui.receive(&mut review_rx).await?;
    println!("  {} captures handed to the review UI", handed_over);
    ui.toggle_deleted(1)?;
    ui.set_annotation(2, "note")?;

    section("Export");
    let path = ui.export_to_dir(&app.export_dir())?;
    println!("  Wrote {}", path.display());

    app.shutdown().await;
    Ok(())
}
