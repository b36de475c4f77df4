use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A class of interchangeable, numbered units sharing one price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<String>,
    pub price: f64,
    pub quantity: u32,
    pub available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
