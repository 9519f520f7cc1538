use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prune::prune;

pub const USAGE: &str = "/api/vehicle-info?rc=DL01AB1234";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing rc parameter")]
    Missing,
}

/// A registration number as the upstream site expects it: trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleQuery(String);

impl VehicleQuery {
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        let normalized = raw.map(|rc| rc.trim().to_uppercase()).unwrap_or_default();
        if normalized.is_empty() {
            return Err(QueryError::Missing);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub status: String,
    pub registration_number: String,
    pub basic_info: BasicInfo,
    pub vehicle_details: BTreeMap<String, String>,
    pub insurance: Insurance,
    pub validity: Validity,
    pub puc: Puc,
    pub other_info: OtherInfo,
    pub source: SourceInfo,
}

impl VehicleInfo {
    #[must_use]
    pub fn new(query: &VehicleQuery) -> Self {
        Self {
            status: "success".into(),
            registration_number: query.as_str().into(),
            basic_info: BasicInfo::default(),
            vehicle_details: BTreeMap::new(),
            insurance: Insurance::default(),
            validity: Validity::default(),
            puc: Puc::default(),
            other_info: OtherInfo::default(),
            source: SourceInfo::default(),
        }
    }

    /// Serializes the record with every empty field and emptied section removed.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self).map(prune)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    pub owner_name: Option<String>,
    pub father_name: Option<String>,
    pub model_name: Option<String>,
    pub vehicle_class: Option<String>,
    pub fuel_type: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Insurance {
    #[serde(flatten)]
    pub status: InsuranceStatus,
    pub company: Option<String>,
    pub policy_number: Option<String>,
    pub valid_upto: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum InsuranceStatus {
    #[default]
    Active,
    Expired { expired_days_ago: u64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Validity {
    pub registration_date: Option<String>,
    pub fitness_upto: Option<String>,
    pub tax_upto: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Puc {
    pub puc_no: Option<String>,
    pub puc_upto: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherInfo {
    pub financer: Option<String>,
    pub permit_type: Option<String>,
    pub blacklist_status: Option<String>,
    pub noc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source: String,
    pub note: String,
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            source: "vahanx.in".into(),
            note: "For educational & informational use only".into(),
        }
    }
}
