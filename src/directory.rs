//! Location directory and route record adapters.
//!
//! HTTP clients for the user directory service, plus in-memory versions
//! for embedding and tests.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::error::CollaboratorError;
use crate::geo::Coordinate;
use crate::model::{Candidate, RouteRecord};
use crate::traits::{LocationDirectory, RecordSink};

#[derive(Debug, Clone)]
pub struct HttpLocationDirectory {
    config: DirectoryConfig,
    client: reqwest::blocking::Client,
}

impl HttpLocationDirectory {
    pub fn new(config: DirectoryConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn fetch_users(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Candidate>, CollaboratorError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let body: UsersResponse = get_json(&self.client, &url, query)?;
        debug!(url = %url, users = body.users.len(), "directory lookup");
        Ok(body.users)
    }
}

impl LocationDirectory for HttpLocationDirectory {
    fn candidates_near(&self, center: Coordinate, radius_km: f64) -> Result<Vec<Candidate>, CollaboratorError> {
        self.fetch_users(
            "/users/nearby",
            &[
                ("lat", format!("{:.6}", center.lat)),
                ("lng", format!("{:.6}", center.lng)),
                ("radius_km", radius_km.to_string()),
            ],
        )
    }

    fn candidates_by_role(&self, role: &str) -> Result<Vec<Candidate>, CollaboratorError> {
        self.fetch_users("/users", &[("role", role.to_string())])
    }
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<Candidate>,
}

fn get_json<T: DeserializeOwned>(
    client: &reqwest::blocking::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, CollaboratorError> {
    let response = client.get(url).query(query).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(CollaboratorError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.json::<T>()?)
}

/// Posts route records to `{base_url}/route_records`.
#[derive(Debug, Clone)]
pub struct HttpRecordSink {
    config: DirectoryConfig,
    client: reqwest::blocking::Client,
}

impl HttpRecordSink {
    pub fn new(config: DirectoryConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RecordSink for HttpRecordSink {
    fn record_route(&self, record: &RouteRecord) -> Result<(), CollaboratorError> {
        let url = format!("{}/route_records", self.config.base_url.trim_end_matches('/'));
        let response = self.client.post(&url).json(record).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// A fixed candidate list searched with Haversine distance.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    candidates: Vec<Candidate>,
}

impl InMemoryDirectory {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl LocationDirectory for InMemoryDirectory {
    fn candidates_near(&self, center: Coordinate, radius_km: f64) -> Result<Vec<Candidate>, CollaboratorError> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| c.location.is_some_and(|loc| center.distance_km(&loc) <= radius_km))
            .cloned()
            .collect())
    }

    fn candidates_by_role(&self, role: &str) -> Result<Vec<Candidate>, CollaboratorError> {
        Ok(self.candidates.iter().filter(|c| c.role == role).cloned().collect())
    }
}

/// Keeps recorded routes in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordSink {
    records: Mutex<Vec<RouteRecord>>,
}

impl MemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RouteRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RecordSink for MemoryRecordSink {
    fn record_route(&self, record: &RouteRecord) -> Result<(), CollaboratorError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
