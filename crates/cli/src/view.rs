//! Plain-text rendering of the two pages.

use std::fmt::Write;

use queue_sync::{Page, Snapshot};
use queue_types::{Barber, BarberStatus, QueueEntry, ServiceType};

const RULE: &str = "----------------------------------------";

/// Render the customer page: stats, the waiting queue and the barbers.
pub fn render_customer(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    header(&mut out, Page::Customer);
    let _ = writeln!(out, "Join the queue and we'll serve you shortly");
    let _ = writeln!(out);
    let _ = writeln!(out, "People in Queue:    {}", snapshot.stats.queue_size);
    let _ = writeln!(
        out,
        "Estimated Wait:     {} min",
        snapshot.stats.estimated_wait_time
    );
    let _ = writeln!(
        out,
        "Available Stylists: {} / {}",
        snapshot.available_count(),
        snapshot.barbers.len()
    );

    section(&mut out, "Current Queue");
    let waiting = snapshot.waiting();
    if waiting.is_empty() {
        let _ = writeln!(out, "No one in queue. Be the first!");
    }
    for entry in waiting {
        queue_line(&mut out, entry);
    }

    section(&mut out, "Our Barbers");
    for barber in &snapshot.barbers {
        let _ = writeln!(
            out,
            "{:<20} Chair #{:<3} {}",
            barber.name,
            barber.chair_no,
            status_label(barber)
        );
    }
    out
}

/// Render the dashboard: counts, barbers, services in progress and the queue.
pub fn render_dashboard(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    header(&mut out, Page::Dashboard);
    let _ = writeln!(out, "Manage barbers and queue");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Barbers:     {}", snapshot.barbers.len());
    let _ = writeln!(out, "Queue Size:        {}", snapshot.stats.queue_size);
    let _ = writeln!(out, "Available Barbers: {}", snapshot.available_count());

    section(&mut out, "Barbers");
    if snapshot.barbers.is_empty() {
        let _ = writeln!(out, "No barbers added yet");
    }
    for barber in &snapshot.barbers {
        let _ = writeln!(
            out,
            "[{}] {:<20} {:<10} Chair #{:<3} {}",
            barber.id,
            barber.name,
            barber.phone,
            barber.chair_no,
            status_label(barber)
        );
    }

    let in_progress = snapshot.in_progress();
    if !in_progress.is_empty() {
        section(&mut out, "In Progress");
        for pair in in_progress {
            let _ = writeln!(
                out,
                "[{}] {:<20} {:<16} Barber: {} (Chair #{})",
                pair.entry.id,
                pair.entry.customer_name,
                pair.entry.service_type,
                pair.barber.name,
                pair.barber.chair_no
            );
        }
    }

    section(&mut out, "Waiting Queue");
    let waiting = snapshot.waiting();
    if waiting.is_empty() {
        let _ = writeln!(out, "No customers in queue");
    }
    for entry in waiting {
        let _ = write!(out, "[{}] ", entry.id);
        queue_line(&mut out, entry);
    }
    out
}

/// The service type menu, one per line.
pub fn render_services() -> String {
    ServiceType::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn header(out: &mut String, page: Page) {
    let _ = writeln!(out, "=== {} ===", page.title());
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{RULE}");
}

fn queue_line(out: &mut String, entry: &QueueEntry) {
    let _ = writeln!(
        out,
        "#{:<3} {:<20} {}",
        entry.position, entry.customer_name, entry.service_type
    );
}

fn status_label(barber: &Barber) -> &'static str {
    match barber.status {
        BarberStatus::Available => "Available",
        BarberStatus::Busy => "Busy",
        BarberStatus::Unknown => "Unknown",
    }
}
