use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse_instant, Record, Status};
use crate::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    /// Installed or planned system size in kW
    #[serde(default)]
    pub solar_capacity: f64,
    #[serde(default)]
    pub monthly_bill: f64,
    #[serde(default)]
    pub installation_date: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Customer {
    pub fn installed_at(&self) -> Option<NaiveDateTime> {
        self.installation_date.as_deref().and_then(parse_instant)
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created_at.as_deref().and_then(parse_instant)
    }
}

impl Record for Customer {
    const COLLECTION: Collection = Collection::Customers;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Partial update; only the fields that are set get written.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_bill: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}
