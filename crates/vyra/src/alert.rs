//! Alerts raised by drivers.
//!
//! A driver raises an alert by picking an occurrence type; the alert is
//! tagged with the driver's name and, when the device provides it, a
//! location. An operator then acknowledges or closes it from the
//! dashboard. The log keeps only the most recent alerts.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Timelike};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::contact::truncate_chars;
use crate::error::Result;
use crate::storage::DocumentStore;

/// Maximum length of a driver name, in characters.
pub const MAX_DRIVER_NAME_LEN: usize = 60;

/// Default number of alerts kept in the log.
pub const DEFAULT_MAX_ALERTS: usize = 100;

/// The kind of incident an alert reports.
///
/// Serialized as its Portuguese label. Any label outside the fixed set
/// reads back as [`Occurrence::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Occurrence {
    /// Suspicious approach.
    SuspiciousApproach,
    /// Attempted robbery.
    AttemptedRobbery,
    /// Threat or intimidation.
    Threat,
    /// Aggressive passenger.
    AggressivePassenger,
    /// Being followed or chased.
    Pursuit,
    /// Suspected express kidnapping.
    ExpressKidnapping,
    /// Medical emergency.
    MedicalEmergency,
    /// Breakdown or road hazard.
    RoadHazard,
    /// Anything else.
    Other,
}

impl Occurrence {
    /// Every occurrence, in the order the driver sees them.
    pub const ALL: [Occurrence; 9] = [
        Self::SuspiciousApproach,
        Self::AttemptedRobbery,
        Self::Threat,
        Self::AggressivePassenger,
        Self::Pursuit,
        Self::ExpressKidnapping,
        Self::MedicalEmergency,
        Self::RoadHazard,
        Self::Other,
    ];

    /// The occurrence used when the request names none.
    pub const DEFAULT: Occurrence = Self::SuspiciousApproach;

    /// The label stored and shown for this occurrence.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SuspiciousApproach => "Abordagem suspeita",
            Self::AttemptedRobbery => "Tentativa de assalto",
            Self::Threat => "Ameaça / intimidação",
            Self::AggressivePassenger => "Passageiro agressivo",
            Self::Pursuit => "Seguimento / perseguição",
            Self::ExpressKidnapping => "Sequestro relâmpago (suspeita)",
            Self::MedicalEmergency => "Emergência médica",
            Self::RoadHazard => "Pane / risco na via",
            Self::Other => "Outro",
        }
    }

    /// Resolve a label, falling back to [`Occurrence::Other`].
    ///
    /// Surrounding whitespace is ignored; matching is otherwise exact.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|occurrence| occurrence.label() == label)
            .unwrap_or(Self::Other)
    }

    /// Labels of every occurrence, in display order.
    #[must_use]
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|o| o.label()).collect()
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Occurrence {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Occurrence> for String {
    fn from(occurrence: Occurrence) -> Self {
        occurrence.label().to_string()
    }
}

/// Where an alert is in its handling.
///
/// Any status may follow any other; the acknowledge operation does not
/// enforce `open → ack → closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Raised, not yet seen.
    Open,
    /// Seen by an operator.
    Ack,
    /// Handled.
    Closed,
}

impl AlertStatus {
    /// Parse a requested status, defaulting to [`AlertStatus::Ack`] when the
    /// value is not recognized.
    #[must_use]
    pub fn parse_or_ack(value: &str) -> Self {
        value.parse().unwrap_or(Self::Ack)
    }

    /// The wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Ack => "ack",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(Self::Open),
            "ack" => Ok(Self::Ack),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown alert status: {other}")),
        }
    }
}

/// A raised alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Milliseconds since the Unix epoch at creation.
    pub id: i64,
    /// Local creation time.
    #[serde(with = "timestamp")]
    pub ts: DateTime<FixedOffset>,
    /// Handling status.
    pub status: AlertStatus,
    /// What happened.
    pub occurrence: Occurrence,
    /// Who raised it.
    pub driver_name: String,
    /// Latitude, if the device reported one.
    #[serde(default, deserialize_with = "coordinate::deserialize")]
    pub lat: Option<f64>,
    /// Longitude, if the device reported one.
    #[serde(default, deserialize_with = "coordinate::deserialize")]
    pub lng: Option<f64>,
    /// Location accuracy in meters, if reported.
    #[serde(default, deserialize_with = "coordinate::deserialize")]
    pub accuracy: Option<f64>,
    /// When the status was last set by an operator.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub ack_ts: Option<DateTime<FixedOffset>>,
}

/// The fields a driver submits when raising an alert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertRequest {
    /// Occurrence label; [`Occurrence::DEFAULT`] when absent.
    pub occurrence: Option<String>,
    /// Driver name; empty when absent.
    pub driver_name: String,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lng: Option<f64>,
    /// Location accuracy.
    pub accuracy: Option<f64>,
}

/// The current local time, truncated to whole seconds.
#[must_use]
pub fn now_local() -> DateTime<FixedOffset> {
    let now = Local::now().fixed_offset();
    now.with_nanosecond(0).unwrap_or(now)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Read a coordinate from a JSON number or a numeric string.
///
/// Anything else, including non-finite values, is `None`.
#[must_use]
pub fn coordinate_from_value(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Lenient decoding of stored coordinates; older documents may hold them
/// as strings.
mod coordinate {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(super::coordinate_from_value))
    }
}

/// Serde helpers for RFC 3339 timestamps with second precision and a
/// numeric offset (`2026-10-18T10:56:00-03:00`).
pub mod timestamp {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Format a timestamp.
    #[must_use]
    pub fn format(ts: &DateTime<FixedOffset>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// Serialize a timestamp.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        ts: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    /// Deserialize a timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the value is not an RFC 3339 string.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }

    /// The same, for optional timestamps.
    pub mod option {
        use chrono::{DateTime, FixedOffset};
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize an optional timestamp.
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<FixedOffset>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_some(&super::format(ts)),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional timestamp.
        ///
        /// # Errors
        ///
        /// Fails if the value is neither null nor an RFC 3339 string.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// The bounded alert history.
///
/// Like the contact book, every operation reads the whole document and
/// mutations rewrite it, one at a time.
#[derive(Clone)]
pub struct AlertLog {
    store: Arc<dyn DocumentStore<Alert>>,
    write_lock: Arc<Mutex<()>>,
    capacity: usize,
}

impl fmt::Debug for AlertLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertLog")
            .field("store", &self.store.location())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl AlertLog {
    /// Create an alert log over `store`, keeping the newest `capacity`
    /// alerts.
    pub fn new(store: Arc<dyn DocumentStore<Alert>>, capacity: usize) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            capacity,
        }
    }

    /// Get the number of alerts kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// List the alerts, oldest first.
    pub async fn list(&self) -> Vec<Alert> {
        self.store.load().await
    }

    /// Raise a new alert and return it.
    ///
    /// Unknown occurrences are recorded as [`Occurrence::Other`]; this never
    /// rejects a request. When the log is over capacity the oldest alerts
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn create(&self, request: AlertRequest) -> Result<Alert> {
        let occurrence = request
            .occurrence
            .as_deref()
            .map_or(Occurrence::DEFAULT, Occurrence::from_label);
        let driver_name = truncate_chars(request.driver_name.trim(), MAX_DRIVER_NAME_LEN);

        let _guard = self.write_lock.lock().await;
        let mut alerts = self.store.load().await;

        // Two alerts raised within the same millisecond still get distinct ids.
        let id = match alerts.iter().map(|a| a.id).max() {
            Some(last) => now_millis().max(last.saturating_add(1)),
            None => now_millis(),
        };

        let alert = Alert {
            id,
            ts: now_local(),
            status: AlertStatus::Open,
            occurrence,
            driver_name: driver_name.to_string(),
            lat: request.lat,
            lng: request.lng,
            accuracy: request.accuracy,
            ack_ts: None,
        };

        alerts.push(alert.clone());
        if alerts.len() > self.capacity {
            let excess = alerts.len() - self.capacity;
            alerts.drain(..excess);
            debug!("Dropped {} oldest alerts", excess);
        }
        self.store.save(&alerts).await?;

        info!(
            "Alert {} raised: {} by {:?}",
            alert.id, alert.occurrence, alert.driver_name
        );
        Ok(alert)
    }

    /// Set the status of the alert whose id reads as `id`.
    ///
    /// Ids are compared in their decimal text form, so `"123"` selects the
    /// alert with id `123`. Only the first match is updated; its `ack_ts`
    /// is set to now. Returns `false`, without writing, when nothing
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn acknowledge(&self, id: &str, status: AlertStatus) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut alerts = self.store.load().await;

        let Some(alert) = alerts.iter_mut().find(|a| a.id.to_string() == id) else {
            debug!("No alert with id {} to mark {}", id, status);
            return Ok(false);
        };

        alert.status = status;
        alert.ack_ts = Some(now_local());
        self.store.save(&alerts).await?;

        info!("Alert {} marked {}", id, status);
        Ok(true)
    }

    /// Remove every alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.save(&[]).await?;
        info!("Cleared alerts at {}", self.store.location());
        Ok(())
    }
}
