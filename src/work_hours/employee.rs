use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Deserialize, Debug)]
pub struct RawWorkRecord {
    #[serde(
        rename(deserialize = "EmployeeId"),
        deserialize_with = "deserialize_id"
    )]
    pub employee_id: String,
    #[serde(default)]
    pub hours: Value,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkRecord {
    pub employee_id: String,
    pub hours: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Employee {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmployeeHoursRow {
    #[serde(rename(serialize = "EmployeeId"))]
    pub employee_id: String,
    #[serde(rename(serialize = "EmployeeName"))]
    pub employee_name: String,
    #[serde(rename(serialize = "TotalHours"))]
    pub total_hours: f64,
}

pub fn validate_record(record: &RawWorkRecord) -> Result<WorkRecord, Error> {
    let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
        .with_context(|| format!("timestamp was not rfc3339 compliant: {:?}", record))?
        .into();

    let hours = parse_hours(&record.hours);
    if hours.is_none() {
        debug!(
            "Ignoring hours {} for employee {} at {}",
            record.hours, record.employee_id, record.timestamp
        );
    }

    Ok(WorkRecord {
        employee_id: record.employee_id.clone(),
        hours,
        timestamp,
    })
}

// the mobile form stored hours as typed text, so numeric strings are accepted
fn parse_hours(value: &Value) -> Option<f64> {
    let hours = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (hours.is_finite() && hours >= 0.).then_some(hours)
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        // 3 and 3.0 name the same employee
        Id::Number(number) => match (number.as_i64(), number.as_u64(), number.as_f64()) {
            (Some(signed), _, _) => signed.to_string(),
            (_, Some(unsigned), _) => unsigned.to_string(),
            (_, _, Some(float)) => float.to_string(),
            _ => number.to_string(),
        },
        Id::Text(text) => text,
    })
}
