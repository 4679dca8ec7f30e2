//! Core types for the walk-in barbershop queue client.
//!
//! This crate defines the entities owned by the remote queue service
//! (barbers, queue entries, queue stats), the request bodies the client
//! sends, and the form types that validate raw user input into them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while validating user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown service type: {0}")]
    UnknownServiceType(String),

    #[error("Chair number must be a positive integer, got {0:?}")]
    InvalidChairNumber(String),
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Services a customer can queue for.
///
/// The service stores the label as free text, so labels outside the menu
/// decode as `Other` instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ServiceType {
    #[default]
    Haircut,
    Shave,
    HaircutAndShave,
    HairColoring,
    Styling,
    /// A label the menu does not offer; empty when the server sent null
    Other(String),
}

impl ServiceType {
    /// Every menu service type, in menu order.
    pub const ALL: [ServiceType; 5] = [
        ServiceType::Haircut,
        ServiceType::Shave,
        ServiceType::HaircutAndShave,
        ServiceType::HairColoring,
        ServiceType::Styling,
    ];

    /// The label the queue service stores and returns.
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Haircut => "Haircut",
            ServiceType::Shave => "Shave",
            ServiceType::HaircutAndShave => "Haircut & Shave",
            ServiceType::HairColoring => "Hair Coloring",
            ServiceType::Styling => "Styling",
            ServiceType::Other(label) => label,
        }
    }

    pub fn is_menu_item(&self) -> bool {
        !matches!(self, ServiceType::Other(_))
    }
}

impl From<Option<String>> for ServiceType {
    fn from(label: Option<String>) -> Self {
        let Some(label) = label else {
            return ServiceType::Other(String::new());
        };
        ServiceType::ALL
            .into_iter()
            .find(|s| s.as_str() == label)
            .unwrap_or(ServiceType::Other(label))
    }
}

impl From<ServiceType> for String {
    fn from(service: ServiceType) -> Self {
        match service {
            ServiceType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ValidationError;

    /// Accepts the wire label or a snake/kebab-case alias, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "haircut" => Ok(ServiceType::Haircut),
            "shave" => Ok(ServiceType::Shave),
            "haircut & shave" | "haircut and shave" => Ok(ServiceType::HaircutAndShave),
            "hair coloring" | "coloring" => Ok(ServiceType::HairColoring),
            "styling" => Ok(ServiceType::Styling),
            _ => Err(ValidationError::UnknownServiceType(s.to_string())),
        }
    }
}

/// Barber availability, set by the server.
///
/// A null status reads as `Available`, like a missing one. Any other
/// unrecognised value reads as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum BarberStatus {
    #[default]
    Available,
    Busy,
    Unknown,
}

impl BarberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarberStatus::Available => "available",
            BarberStatus::Busy => "busy",
            BarberStatus::Unknown => "unknown",
        }
    }
}

impl From<Option<String>> for BarberStatus {
    fn from(status: Option<String>) -> Self {
        match status.as_deref().map(str::trim) {
            None => BarberStatus::Available,
            Some(s) if s.eq_ignore_ascii_case("available") => BarberStatus::Available,
            Some(s) if s.eq_ignore_ascii_case("busy") => BarberStatus::Busy,
            Some(_) => BarberStatus::Unknown,
        }
    }
}

impl fmt::Display for BarberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a queue entry on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    /// Waiting in line
    Waiting,
    /// Assigned to a barber
    InProgress,
    /// Service finished
    Done,
}

/// A barber with a fixed chair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    /// Server identifier
    #[serde(rename = "barberId")]
    pub id: String,
    #[serde(rename = "barberName")]
    pub name: String,
    #[serde(rename = "barberPhone")]
    pub phone: String,
    #[serde(rename = "barberChairNo")]
    pub chair_no: u32,
    #[serde(default)]
    pub status: BarberStatus,
    /// Queue entry currently in this barber's chair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_customer_id: Option<String>,
}

impl Barber {
    pub fn is_available(&self) -> bool {
        self.status == BarberStatus::Available
    }

    pub fn is_busy(&self) -> bool {
        self.status == BarberStatus::Busy
    }
}

/// One customer's pending or in-progress service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub customer_name: String,
    pub service_type: ServiceType,
    /// 1-based, assigned by the server
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<QueueStatus>,
    /// Barber serving this entry, once called
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<NaiveDateTime>,
}

/// Aggregate queue figures computed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    /// Number of waiting entries
    pub queue_size: u64,
    /// Estimated wait for a new customer, in minutes
    pub estimated_wait_time: u64,
}

/// Body of `POST /queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQueueEntry {
    pub customer_name: String,
    pub service_type: ServiceType,
}

impl NewQueueEntry {
    pub fn new(customer_name: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            customer_name: customer_name.into(),
            service_type,
        }
    }
}

/// Body of `POST /barbers` and `PUT /barbers/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBarber {
    #[serde(rename = "barberName")]
    pub name: String,
    #[serde(rename = "barberPhone")]
    pub phone: String,
    #[serde(rename = "barberChairNo")]
    pub chair_no: u32,
}

impl NewBarber {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, chair_no: u32) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            chair_no,
        }
    }
}

/// Raw input of the join-queue form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinForm {
    pub customer_name: String,
    pub service_type: String,
}

impl Default for JoinForm {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            service_type: ServiceType::default().as_str().to_string(),
        }
    }
}

impl JoinForm {
    pub fn new(customer_name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            service_type: service_type.into(),
        }
    }

    /// Check the form and build the request body.
    pub fn validate(&self) -> Result<NewQueueEntry> {
        let name = self.customer_name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Customer name"));
        }
        let service_type = self.service_type.parse::<ServiceType>()?;
        Ok(NewQueueEntry::new(name, service_type))
    }
}

/// Raw input of the add/edit barber form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarberForm {
    pub name: String,
    pub phone: String,
    pub chair_no: String,
}

impl BarberForm {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        chair_no: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            chair_no: chair_no.into(),
        }
    }

    /// Prefill the form from an existing barber, for editing.
    pub fn from_barber(barber: &Barber) -> Self {
        Self {
            name: barber.name.clone(),
            phone: barber.phone.clone(),
            chair_no: barber.chair_no.to_string(),
        }
    }

    /// Check all three fields and build the request body.
    pub fn validate(&self) -> Result<NewBarber> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Name"));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::MissingField("Phone"));
        }
        let chair = self.chair_no.trim();
        if chair.is_empty() {
            return Err(ValidationError::MissingField("Chair number"));
        }
        let chair_no = match chair.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(ValidationError::InvalidChairNumber(chair.to_string())),
        };
        Ok(NewBarber::new(name, phone, chair_no))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_wire_labels() {
        let json = serde_json::to_string(&ServiceType::HaircutAndShave).unwrap();
        assert_eq!(json, "\"Haircut & Shave\"");

        let parsed: ServiceType = serde_json::from_str("\"Hair Coloring\"").unwrap();
        assert_eq!(parsed, ServiceType::HairColoring);
    }

    #[test]
    fn test_service_type_parse_aliases() {
        assert_eq!("haircut".parse::<ServiceType>(), Ok(ServiceType::Haircut));
        assert_eq!("SHAVE".parse::<ServiceType>(), Ok(ServiceType::Shave));
        assert_eq!(
            "haircut_and_shave".parse::<ServiceType>(),
            Ok(ServiceType::HaircutAndShave)
        );
        assert_eq!(
            "Haircut & Shave".parse::<ServiceType>(),
            Ok(ServiceType::HaircutAndShave)
        );
        assert_eq!(
            "hair-coloring".parse::<ServiceType>(),
            Ok(ServiceType::HairColoring)
        );
    }

    #[test]
    fn test_service_type_parse_unknown() {
        assert_eq!(
            "perm".parse::<ServiceType>(),
            Err(ValidationError::UnknownServiceType("perm".to_string()))
        );
    }

    #[test]
    fn test_service_type_display_matches_serde() {
        for service in ServiceType::ALL {
            let json = serde_json::to_string(&service).unwrap();
            assert_eq!(json, format!("\"{service}\""));
        }
    }

    #[test]
    fn test_unlisted_service_type_is_kept() {
        let json = r#"[
            {"id": "q1", "customerName": "John Doe", "serviceType": "Beard Trim", "position": 1},
            {"id": "q2", "customerName": "Jane Smith", "serviceType": "Shave", "position": 2},
            {"id": "q3", "customerName": "Bob Wilson", "serviceType": null, "position": 3}
        ]"#;

        let entries: Vec<QueueEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].service_type, ServiceType::Other("Beard Trim".to_string()));
        assert_eq!(entries[0].service_type.to_string(), "Beard Trim");
        assert!(!entries[0].service_type.is_menu_item());
        assert_eq!(entries[1].service_type, ServiceType::Shave);
        assert_eq!(entries[2].service_type, ServiceType::Other(String::new()));

        let back = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(back["serviceType"], "Beard Trim");
    }

    #[test]
    fn test_barber_status_tolerates_null_and_unknown() {
        let json = r#"[
            {"barberId": "b1", "barberName": "Mike", "barberPhone": "555", "barberChairNo": 1, "status": null},
            {"barberId": "b2", "barberName": "Sarah", "barberPhone": "556", "barberChairNo": 2, "status": "on break"},
            {"barberId": "b3", "barberName": "James", "barberPhone": "557", "barberChairNo": 3, "status": "BUSY"},
            {"barberId": "b4", "barberName": "Ann", "barberPhone": "558", "barberChairNo": 4}
        ]"#;

        let barbers: Vec<Barber> = serde_json::from_str(json).unwrap();
        let statuses: Vec<BarberStatus> = barbers.iter().map(|b| b.status).collect();
        assert_eq!(
            statuses,
            vec![
                BarberStatus::Available,
                BarberStatus::Unknown,
                BarberStatus::Busy,
                BarberStatus::Available
            ]
        );
        assert!(!barbers[1].is_available());
        assert!(!barbers[1].is_busy());
        assert_eq!(serde_json::to_string(&BarberStatus::Busy).unwrap(), "\"busy\"");
    }

    #[test]
    fn test_barber_deserialization() {
        let json = r#"{
            "barberId": "b1",
            "barberName": "Mike Johnson",
            "barberPhone": "555-0101",
            "barberChairNo": 1,
            "status": "busy",
            "currentCustomerId": "q9"
        }"#;

        let barber: Barber = serde_json::from_str(json).unwrap();
        assert_eq!(barber.id, "b1");
        assert_eq!(barber.chair_no, 1);
        assert!(barber.is_busy());
        assert_eq!(barber.current_customer_id.as_deref(), Some("q9"));
    }

    #[test]
    fn test_barber_null_customer() {
        let json = r#"{
            "barberId": "b1",
            "barberName": "Mike",
            "barberPhone": "555",
            "barberChairNo": 2,
            "status": "available",
            "currentCustomerId": null
        }"#;

        let barber: Barber = serde_json::from_str(json).unwrap();
        assert!(barber.is_available());
        assert!(barber.current_customer_id.is_none());
    }

    #[test]
    fn test_queue_entry_deserialization() {
        let json = r#"{
            "id": "q1",
            "customerName": "John Doe",
            "serviceType": "Haircut",
            "status": "IN_PROGRESS",
            "barberId": "b1",
            "joinedAt": "2024-05-01T10:15:30.123",
            "position": 1
        }"#;

        let entry: QueueEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.customer_name, "John Doe");
        assert_eq!(entry.status, Some(QueueStatus::InProgress));
        assert_eq!(entry.barber_id.as_deref(), Some("b1"));
        assert!(entry.joined_at.is_some());
    }

    #[test]
    fn test_queue_stats_deserialization() {
        let stats: QueueStats =
            serde_json::from_str(r#"{"queueSize": 3, "estimatedWaitTime": 25}"#).unwrap();
        assert_eq!(stats.queue_size, 3);
        assert_eq!(stats.estimated_wait_time, 25);
    }

    #[test]
    fn test_new_barber_serialization() {
        let body = serde_json::to_value(NewBarber::new("Mike", "555-0101", 1)).unwrap();
        assert_eq!(body["barberName"], "Mike");
        assert_eq!(body["barberPhone"], "555-0101");
        assert_eq!(body["barberChairNo"], 1);
    }

    #[test]
    fn test_join_form_default_service() {
        let form = JoinForm::default();
        assert_eq!(form.service_type, "Haircut");
    }

    #[test]
    fn test_join_form_validate() {
        let body = JoinForm::new("  John Doe ", "Haircut").validate().unwrap();
        assert_eq!(body.customer_name, "John Doe");
        assert_eq!(body.service_type, ServiceType::Haircut);
    }

    #[test]
    fn test_join_form_rejects_blank_name() {
        let err = JoinForm::new("   ", "Shave").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("Customer name"));
    }

    #[test]
    fn test_join_form_rejects_unknown_service() {
        let err = JoinForm::new("Jane", "Manicure").validate().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownServiceType(_)));
    }

    #[test]
    fn test_barber_form_validate() {
        let body = BarberForm::new("Sarah", "555-0102", " 2 ").validate().unwrap();
        assert_eq!(body, NewBarber::new("Sarah", "555-0102", 2));
    }

    #[test]
    fn test_barber_form_missing_fields() {
        assert_eq!(
            BarberForm::new("", "555", "1").validate(),
            Err(ValidationError::MissingField("Name"))
        );
        assert_eq!(
            BarberForm::new("Sarah", " ", "1").validate(),
            Err(ValidationError::MissingField("Phone"))
        );
        assert_eq!(
            BarberForm::new("Sarah", "555", "").validate(),
            Err(ValidationError::MissingField("Chair number"))
        );
    }

    #[test]
    fn test_barber_form_invalid_chair() {
        assert!(matches!(
            BarberForm::new("Sarah", "555", "zero").validate(),
            Err(ValidationError::InvalidChairNumber(_))
        ));
        assert!(matches!(
            BarberForm::new("Sarah", "555", "0").validate(),
            Err(ValidationError::InvalidChairNumber(_))
        ));
    }

    #[test]
    fn test_barber_form_prefill() {
        let barber = Barber {
            id: "b1".to_string(),
            name: "James Brown".to_string(),
            phone: "555-0103".to_string(),
            chair_no: 3,
            status: BarberStatus::Busy,
            current_customer_id: None,
        };

        let form = BarberForm::from_barber(&barber);
        assert_eq!(form.chair_no, "3");
        assert_eq!(form.validate().unwrap(), NewBarber::new("James Brown", "555-0103", 3));
    }
}
