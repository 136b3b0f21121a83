//! Text rendering helpers shared by commands.

use autohost_config::PersistedSettings;
use autohost_core::Peer;

const BAR_WIDTH: usize = 20;

/// `[#####---------------]  25%`
pub(crate) fn progress_bar(fraction: f64) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (fraction * 100.0).round() as u32
    )
}

/// Whole seconds, rounded up.
pub(crate) fn format_remaining(remaining_ms: u64) -> String {
    let secs = remaining_ms.div_ceil(1000);
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub(crate) fn print_rotation_order(snapshot: &[Peer], hosted: Option<usize>) {
    if snapshot.is_empty() {
        println!("Rotation: idle (select friends with `autohost select <id>`)");
        return;
    }
    println!("Rotation order:");
    for (i, peer) in snapshot.iter().enumerate() {
        let marker = if Some(i) == hosted { ">" } else { " " };
        println!("  {marker} {}. {} (id {})", i + 1, peer.display_name, peer.id);
    }
}

pub(crate) fn print_settings(settings: &PersistedSettings) {
    println!("Notifications: {}", settings.notification_delay);
    if settings.last_notification_time > 0 {
        let last = chrono::DateTime::from_timestamp_millis(settings.last_notification_time)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| settings.last_notification_time.to_string());
        println!("Last notification: {last}");
    }
    if settings.webhook_url.is_empty() {
        println!("Webhook: (none)");
    } else {
        println!("Webhook: {} (stored only)", settings.webhook_url);
    }
}
