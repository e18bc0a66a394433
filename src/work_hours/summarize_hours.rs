use crate::work_hours::employee::{Employee, EmployeeHoursRow, WorkRecord};
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

pub fn aggregate(
    records: &[WorkRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BTreeMap<String, f64> {
    let mut hours_by_employee: HashMap<&str, Vec<f64>> = HashMap::new();
    for record in records
        .iter()
        .filter(|record| start <= record.timestamp && record.timestamp <= end)
    {
        if let Some(hours) = record.hours {
            hours_by_employee
                .entry(record.employee_id.as_str())
                .or_default()
                .push(hours);
        }
    }

    hours_by_employee
        .into_iter()
        .map(|(employee_id, mut hours)| {
            // summing in sorted order keeps float totals independent of record order
            hours.sort_by(f64::total_cmp);
            (employee_id.to_string(), hours.iter().sum::<f64>())
        })
        .collect()
}

pub fn dashboard_rows(
    employees: &[Employee],
    totals: &BTreeMap<String, f64>,
) -> Vec<EmployeeHoursRow> {
    for employee_id in totals.keys() {
        if !employees.iter().any(|employee| &employee.id == employee_id) {
            debug!("Hours recorded for unknown employee {}", employee_id);
        }
    }

    employees
        .iter()
        .map(|employee| EmployeeHoursRow {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            total_hours: totals.get(&employee.id).copied().unwrap_or(0.),
        })
        .collect()
}
