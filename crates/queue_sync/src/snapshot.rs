//! The client's read replica of server state.

use queue_types::{Barber, QueueEntry, QueueStats, QueueStatus};

/// One poll cycle's worth of server state, replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Refresh cycle that produced this snapshot; 0 until the first fetch lands
    pub cycle: u64,
    /// Entries returned by `GET /queue`, in server order
    pub queue: Vec<QueueEntry>,
    pub barbers: Vec<Barber>,
    pub stats: QueueStats,
    /// In-progress entries fetched by id because the queue listing omits them
    pub active: Vec<QueueEntry>,
}

/// A busy barber and the entry in their chair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InProgress<'a> {
    pub barber: &'a Barber,
    pub entry: &'a QueueEntry,
}

impl Snapshot {
    pub fn is_loaded(&self) -> bool {
        self.cycle > 0
    }

    /// Entries still waiting to be called.
    pub fn waiting(&self) -> Vec<&QueueEntry> {
        self.queue
            .iter()
            .filter(|e| matches!(e.status, None | Some(QueueStatus::Waiting)))
            .collect()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.waiting().is_empty()
    }

    /// The entry the next call-next will assign.
    pub fn head(&self) -> Option<&QueueEntry> {
        self.waiting().into_iter().min_by_key(|e| e.position)
    }

    pub fn barber(&self, id: &str) -> Option<&Barber> {
        self.barbers.iter().find(|b| b.id == id)
    }

    pub fn available_count(&self) -> usize {
        self.barbers.iter().filter(|b| b.is_available()).count()
    }

    pub fn busy_count(&self) -> usize {
        self.barbers.iter().filter(|b| b.is_busy()).count()
    }

    /// Pair every busy barber with the entry they are serving.
    ///
    /// Busy barbers whose entry is not in this snapshot are left out.
    pub fn in_progress(&self) -> Vec<InProgress<'_>> {
        self.barbers
            .iter()
            .filter(|b| b.is_busy())
            .filter_map(|barber| {
                self.queue
                    .iter()
                    .chain(self.active.iter())
                    .find(|e| {
                        barber.current_customer_id.as_deref() == Some(e.id.as_str())
                            || e.barber_id.as_deref() == Some(barber.id.as_str())
                    })
                    .map(|entry| InProgress { barber, entry })
            })
            .collect()
    }

    /// The in-progress pairing for one entry, if it is being served.
    pub fn serving(&self, entry_id: &str) -> Option<InProgress<'_>> {
        self.in_progress()
            .into_iter()
            .find(|p| p.entry.id == entry_id)
    }
}
