//! In-memory queue service for tests.
//!
//! Mirrors the observable behaviour of the real backend closely enough to
//! drive the store, dispatcher and seeder end to end. Every call is recorded
//! as `"METHOD /path"` so tests can assert which requests were issued.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use queue_types::{
    Barber, BarberStatus, NewBarber, NewQueueEntry, QueueEntry, QueueStats, QueueStatus,
};

use crate::{QueueApi, RequestError, Result};

/// Average service time the backend assumes, in minutes.
const AVG_SERVICE_MINUTES: f64 = 25.0;

#[derive(Default)]
struct ShopState {
    barbers: Vec<Barber>,
    entries: Vec<QueueEntry>,
    requests: Vec<String>,
    failing_routes: HashSet<&'static str>,
    garbled_routes: HashSet<&'static str>,
    offline: bool,
}

impl ShopState {
    fn waiting(&self) -> Vec<QueueEntry> {
        let mut waiting: Vec<QueueEntry> = self
            .entries
            .iter()
            .filter(|e| e.status == Some(QueueStatus::Waiting))
            .cloned()
            .collect();
        waiting.sort_by_key(|e| e.position);
        waiting
    }

    fn reorder(&mut self) {
        let mut ids: Vec<(u32, String)> = self
            .entries
            .iter()
            .filter(|e| e.status == Some(QueueStatus::Waiting))
            .map(|e| (e.position, e.id.clone()))
            .collect();
        ids.sort();

        for (idx, (_, id)) in ids.iter().enumerate() {
            if let Some(entry) = self.entries.iter_mut().find(|e| &e.id == id) {
                entry.position = idx as u32 + 1;
            }
        }
    }

    /// Answer a successful request, unless its route is set to garble the body.
    fn reply<T>(&self, route: &'static str, value: T) -> Result<T> {
        if self.garbled_routes.contains(route) {
            return Err(RequestError::Decode(format!(
                "{route}: response body could not be decoded"
            )));
        }
        Ok(value)
    }

    fn barber_mut(&mut self, id: &str) -> Result<&mut Barber> {
        self.barbers
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| not_found("Barber not found"))
    }

    fn wait_time(&self, position: u64) -> u64 {
        let total = self.barbers.len() as u64;
        let available = self.barbers.iter().filter(|b| b.is_available()).count();
        if total == 0 {
            return 0;
        }
        if available > 0 && position == 1 {
            return 0;
        }
        ((position as f64 / total as f64) * AVG_SERVICE_MINUTES).ceil() as u64
    }
}

fn not_found(message: &str) -> RequestError {
    RequestError::Status {
        status: 404,
        message: message.to_string(),
    }
}

fn bad_request(message: &str) -> RequestError {
    RequestError::Status {
        status: 400,
        message: message.to_string(),
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// In-memory [`QueueApi`] implementation.
#[derive(Default)]
pub struct FakeShop {
    state: Mutex<ShopState>,
}

impl FakeShop {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ShopState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a request and fail it if the shop is offline or the route is
    /// marked as failing.
    fn enter(&self, route: &'static str, request: String) -> Result<MutexGuard<'_, ShopState>> {
        let mut state = self.state();
        state.requests.push(request);
        if state.offline {
            return Err(RequestError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        if state.failing_routes.contains(route) {
            return Err(RequestError::Status {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(state)
    }

    /// Insert a barber directly, without recording a request.
    pub fn add_barber(&self, name: &str, phone: &str, chair_no: u32) -> Barber {
        let barber = Barber {
            id: new_id(),
            name: name.to_string(),
            phone: phone.to_string(),
            chair_no,
            status: BarberStatus::Available,
            current_customer_id: None,
        };
        self.state().barbers.push(barber.clone());
        barber
    }

    /// Append a waiting customer directly, without recording a request.
    pub fn add_customer(&self, entry: &NewQueueEntry) -> QueueEntry {
        let mut state = self.state();
        let position = state.waiting().len() as u32 + 1;
        let created = QueueEntry {
            id: new_id(),
            customer_name: entry.customer_name.clone(),
            service_type: entry.service_type.clone(),
            position,
            status: Some(QueueStatus::Waiting),
            barber_id: None,
            joined_at: None,
        };
        state.entries.push(created.clone());
        created
    }

    /// Make every subsequent request fail with 503.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Make requests to one route template (e.g. `"POST /queue"`) fail with 500.
    pub fn fail_route(&self, route: &'static str) {
        self.state().failing_routes.insert(route);
    }

    /// Apply requests to one route but answer with a body that does not decode.
    pub fn garble_route(&self, route: &'static str) {
        self.state().garbled_routes.insert(route);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_routes.clear();
        state.garbled_routes.clear();
        state.offline = false;
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    /// Number of requests whose method matches.
    pub fn count_requests(&self, method: &str) -> usize {
        let prefix = format!("{method} ");
        self.state()
            .requests
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .count()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    pub fn barbers(&self) -> Vec<Barber> {
        self.state().barbers.clone()
    }

    /// Every entry the shop knows about, including in-progress and done ones.
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.state().entries.clone()
    }
}

#[async_trait]
impl QueueApi for FakeShop {
    async fn list_barbers(&self) -> Result<Vec<Barber>> {
        let state = self.enter("GET /barbers", "GET /barbers".into())?;
        Ok(state.barbers.clone())
    }

    async fn get_barber(&self, id: &str) -> Result<Barber> {
        let state = self.enter("GET /barbers/{id}", format!("GET /barbers/{id}"))?;
        state
            .barbers
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| not_found("Barber not found"))
    }

    async fn create_barber(&self, barber: &NewBarber) -> Result<Barber> {
        let mut state = self.enter("POST /barbers", "POST /barbers".into())?;
        let created = Barber {
            id: new_id(),
            name: barber.name.clone(),
            phone: barber.phone.clone(),
            chair_no: barber.chair_no,
            status: BarberStatus::Available,
            current_customer_id: None,
        };
        state.barbers.push(created.clone());
        state.reply("POST /barbers", created)
    }

    async fn update_barber(&self, id: &str, barber: &NewBarber) -> Result<Barber> {
        let mut state = self.enter("PUT /barbers/{id}", format!("PUT /barbers/{id}"))?;
        let existing = state.barber_mut(id)?;
        existing.name = barber.name.clone();
        existing.phone = barber.phone.clone();
        existing.chair_no = barber.chair_no;
        let updated = existing.clone();
        state.reply("PUT /barbers/{id}", updated)
    }

    async fn delete_barber(&self, id: &str) -> Result<()> {
        let mut state = self.enter("DELETE /barbers/{id}", format!("DELETE /barbers/{id}"))?;
        state.barbers.retain(|b| b.id != id);
        state.reply("DELETE /barbers/{id}", ())
    }

    async fn update_barber_status(&self, id: &str, status: BarberStatus) -> Result<Barber> {
        let mut state = self.enter(
            "PATCH /barbers/{id}/status",
            format!("PATCH /barbers/{id}/status?status={status}"),
        )?;
        let barber = state.barber_mut(id)?;
        barber.status = status;
        Ok(barber.clone())
    }

    async fn available_barbers(&self) -> Result<Vec<Barber>> {
        let state = self.enter("GET /barbers/available", "GET /barbers/available".into())?;
        Ok(state
            .barbers
            .iter()
            .filter(|b| b.is_available())
            .cloned()
            .collect())
    }

    async fn finish_service(&self, barber_id: &str) -> Result<Barber> {
        let mut state = self.enter(
            "POST /barbers/{id}/finish-service",
            format!("POST /barbers/{barber_id}/finish-service"),
        )?;
        let barber = state.barber_mut(barber_id)?;
        barber.status = BarberStatus::Available;
        barber.current_customer_id = None;
        Ok(barber.clone())
    }

    async fn list_queue(&self) -> Result<Vec<QueueEntry>> {
        let state = self.enter("GET /queue", "GET /queue".into())?;
        Ok(state.waiting())
    }

    async fn get_queue_entry(&self, id: &str) -> Result<QueueEntry> {
        let state = self.enter("GET /queue/{id}", format!("GET /queue/{id}"))?;
        state
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| not_found("Queue entry not found"))
    }

    async fn join_queue(&self, entry: &NewQueueEntry) -> Result<QueueEntry> {
        drop(self.enter("POST /queue", "POST /queue".into())?);
        let created = self.add_customer(entry);
        self.state().reply("POST /queue", created)
    }

    async fn remove_from_queue(&self, id: &str) -> Result<()> {
        let mut state = self.enter("DELETE /queue/{id}", format!("DELETE /queue/{id}"))?;
        state.entries.retain(|e| e.id != id);
        state.reorder();
        state.reply("DELETE /queue/{id}", ())
    }

    async fn call_next(&self, barber_id: &str) -> Result<QueueEntry> {
        let mut state = self.enter(
            "POST /queue/call-next",
            format!("POST /queue/call-next?barberId={barber_id}"),
        )?;
        let Some(next_id) = state.waiting().first().map(|e| e.id.clone()) else {
            return Err(bad_request("No customers in queue"));
        };

        let barber = state.barber_mut(barber_id).map_err(|_| bad_request("Barber not found"))?;
        barber.status = BarberStatus::Busy;
        barber.current_customer_id = Some(next_id.clone());

        let mut called = None;
        if let Some(entry) = state.entries.iter_mut().find(|e| e.id == next_id) {
            entry.status = Some(QueueStatus::InProgress);
            entry.barber_id = Some(barber_id.to_string());
            called = Some(entry.clone());
        }
        state.reorder();
        let called = called.ok_or_else(|| bad_request("No customers in queue"))?;
        state.reply("POST /queue/call-next", called)
    }

    async fn complete_service(&self, id: &str) -> Result<QueueEntry> {
        let mut state = self.enter("POST /queue/{id}/complete", format!("POST /queue/{id}/complete"))?;
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found("Queue entry not found"))?;
        entry.status = Some(QueueStatus::Done);
        let completed = entry.clone();

        if let Some(barber_id) = completed.barber_id.as_deref() {
            let barber = state.barber_mut(barber_id)?;
            barber.status = BarberStatus::Available;
            barber.current_customer_id = None;
        }
        state.reply("POST /queue/{id}/complete", completed)
    }

    async fn queue_stats(&self) -> Result<QueueStats> {
        let state = self.enter("GET /queue/stats", "GET /queue/stats".into())?;
        let queue_size = state.waiting().len() as u64;
        Ok(QueueStats {
            queue_size,
            estimated_wait_time: state.wait_time(queue_size + 1),
        })
    }
}
