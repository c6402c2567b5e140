//! Agent-submitted device reports.
//!
//! Remote sites run a sweep locally and push their `{ip, mac, hostname}`
//! triples under a bearer token that maps to an organizational unit.
//! This module owns the token → unit resolution and the in-memory store;
//! transport and persistence are a collaborator's problem.
//!
//! Auth order is fixed: an absent or malformed header is rejected before
//! any data is touched (401), an unrecognized token afterwards (403).

use std::collections::HashMap;
use std::time::SystemTime;

use thiserror::Error;
use tracing::info;

use invscan_common::network::host::SweepEntry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("no bearer token provided")]
    MissingToken,
    #[error("token not recognized")]
    UnknownToken,
}

impl IngestError {
    /// The HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            IngestError::MissingToken => 401,
            IngestError::UnknownToken => 403,
        }
    }
}

/// One device row as reported by an agent.
#[derive(Debug, Clone)]
pub struct ReportedDevice {
    pub entry: SweepEntry,
    pub reported_at: SystemTime,
}

#[derive(Debug, Clone)]
struct Unit {
    code: String,
    name: String,
}

/// Token-keyed registry of organizational units and their reported
/// device lists.
#[derive(Default)]
pub struct UnitRegistry {
    units: HashMap<String, Unit>,
    reports: HashMap<String, Vec<ReportedDevice>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, code: impl Into<String>, name: impl Into<String>, token: impl Into<String>) {
        let unit = Unit {
            code: code.into(),
            name: name.into(),
        };
        self.units.insert(token.into(), unit);
    }

    /// Accepts a batch under the token carried in `authorization`.
    /// Returns the number of rows stored. `reported_at` defaults to now
    /// when the agent did not send a timestamp.
    pub fn submit(
        &mut self,
        authorization: Option<&str>,
        batch: Vec<SweepEntry>,
        reported_at: Option<SystemTime>,
    ) -> Result<usize, IngestError> {
        let token = parse_bearer(authorization)?;
        let unit = self.units.get(token).ok_or(IngestError::UnknownToken)?;

        let code = unit.code.clone();
        let reported_at = reported_at.unwrap_or_else(SystemTime::now);
        let rows = self.reports.entry(code.clone()).or_default();
        let stored = batch.len();
        rows.extend(batch.into_iter().map(|entry| ReportedDevice {
            entry,
            reported_at,
        }));

        info!("stored {stored} device(s) for unit {code}");
        Ok(stored)
    }

    /// Read side: the unit's identity plus every device ever reported
    /// for it, or `None` when no such unit exists.
    pub fn report_for(&self, code: &str) -> Option<UnitReport<'_>> {
        let unit = self.units.values().find(|unit| unit.code == code)?;
        let devices = self.reports.get(code).map(Vec::as_slice).unwrap_or(&[]);
        Some(UnitReport {
            code: &unit.code,
            name: &unit.name,
            devices,
        })
    }
}

/// What the read endpoint hands back for one unit.
#[derive(Debug)]
pub struct UnitReport<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub devices: &'a [ReportedDevice],
}

fn parse_bearer(authorization: Option<&str>) -> Result<&str, IngestError> {
    let header = authorization.ok_or(IngestError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(IngestError::MissingToken)?
        .trim();
    if token.is_empty() {
        return Err(IngestError::MissingToken);
    }
    Ok(token)
}
