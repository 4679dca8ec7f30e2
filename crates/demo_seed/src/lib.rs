//! Demo data for the barber queue service.
//!
//! This crate seeds a fresh backend with a few barbers and waiting customers,
//! and clears everything back out for a clean demo.

use queue_client::{QueueApi, RequestError};
use queue_sync::Prompter;
use queue_types::{NewBarber, NewQueueEntry, ServiceType};
use thiserror::Error;
use tracing::info;

pub const CLEAR_ALL_PROMPT: &str =
    "Are you sure you want to delete ALL data? This cannot be undone!";

/// Errors from seeding or clearing.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Request failed after {completed} writes: {source}")]
    Request {
        /// Writes that succeeded before the failure
        completed: usize,
        #[source]
        source: RequestError,
    },

    #[error("Cancelled by user")]
    Cancelled,
}

/// Result type for seeding operations.
pub type Result<T> = std::result::Result<T, SeedError>;

/// Counts of records created by [`seed_demo_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub barbers: usize,
    pub customers: usize,
}

/// Counts of records deleted by [`clear_all_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearSummary {
    pub queue_entries: usize,
    pub barbers: usize,
}

/// The built-in demo barbers, one per chair.
pub fn demo_barbers() -> Vec<NewBarber> {
    vec![
        NewBarber::new("Mike Johnson", "555-0101", 1),
        NewBarber::new("Sarah Williams", "555-0102", 2),
        NewBarber::new("James Brown", "555-0103", 3),
    ]
}

/// The built-in demo customers, in the order they join.
pub fn demo_customers() -> Vec<NewQueueEntry> {
    vec![
        NewQueueEntry::new("John Doe", ServiceType::Haircut),
        NewQueueEntry::new("Jane Smith", ServiceType::HaircutAndShave),
        NewQueueEntry::new("Bob Wilson", ServiceType::Shave),
        NewQueueEntry::new("Alice Johnson", ServiceType::HairColoring),
        NewQueueEntry::new("Charlie Brown", ServiceType::Styling),
    ]
}

/// Create the demo barbers, then the demo customers, one request at a time.
///
/// Stops at the first failure; records created before it are kept.
pub async fn seed_demo_data<A: QueueApi + ?Sized>(api: &A) -> Result<SeedSummary> {
    let mut completed = 0;
    info!("Seeding demo data");

    let barbers = demo_barbers();
    for barber in &barbers {
        api.create_barber(barber)
            .await
            .map_err(|source| SeedError::Request { completed, source })?;
        completed += 1;
        info!(barber = %barber.name, "Added barber");
    }

    let customers = demo_customers();
    for customer in &customers {
        api.join_queue(customer)
            .await
            .map_err(|source| SeedError::Request { completed, source })?;
        completed += 1;
        info!(customer = %customer.customer_name, "Added customer");
    }

    let summary = SeedSummary {
        barbers: barbers.len(),
        customers: customers.len(),
    };
    info!(barbers = summary.barbers, customers = summary.customers, "Demo data seeded");
    Ok(summary)
}

/// Delete every listed queue entry and then every barber, after confirmation.
///
/// Declining sends no request at all.
pub async fn clear_all_data<A: QueueApi + ?Sized>(
    api: &A,
    prompter: &dyn Prompter,
) -> Result<ClearSummary> {
    if !prompter.confirm(CLEAR_ALL_PROMPT).await {
        return Err(SeedError::Cancelled);
    }

    info!("Clearing all data");

    let (barbers, queue) = tokio::try_join!(api.list_barbers(), api.list_queue())
        .map_err(|source| SeedError::Request {
            completed: 0,
            source,
        })?;

    let mut completed = 0;
    for entry in &queue {
        api.remove_from_queue(&entry.id)
            .await
            .map_err(|source| SeedError::Request { completed, source })?;
        completed += 1;
        info!(customer = %entry.customer_name, "Deleted queue entry");
    }

    for barber in &barbers {
        api.delete_barber(&barber.id)
            .await
            .map_err(|source| SeedError::Request { completed, source })?;
        completed += 1;
        info!(barber = %barber.name, "Deleted barber");
    }

    let summary = ClearSummary {
        queue_entries: queue.len(),
        barbers: barbers.len(),
    };
    info!(
        queue_entries = summary.queue_entries,
        barbers = summary.barbers,
        "All data cleared"
    );
    Ok(summary)
}
