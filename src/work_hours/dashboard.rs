use crate::work_hours::{
    employee::EmployeeHoursRow,
    label::period_label,
    period::{advance, DateRange, Direction, Granularity, InvalidDateError, Period},
    source::WorkRecordSource,
    summarize_hours::{aggregate, dashboard_rows},
};

use anyhow::{Context, Error};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectGranularity(Granularity),
    Navigate(Direction),
    JumpTo(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardState {
    pub granularity: Granularity,
    pub reference: NaiveDate,
}

impl DashboardState {
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            granularity: Granularity::default(),
            reference,
        }
    }

    pub fn reduce(self, action: Action) -> Result<Self, InvalidDateError> {
        let next = match action {
            Action::SelectGranularity(granularity) => Self {
                granularity,
                ..self
            },
            Action::Navigate(direction) => Self {
                reference: advance(self.reference, self.granularity, direction)?,
                ..self
            },
            Action::JumpTo(reference) => Self { reference, ..self },
        };
        debug!(
            "{:?}: {} {} -> {} {}",
            action, self.granularity, self.reference, next.granularity, next.reference
        );
        Ok(next)
    }

    pub fn period(&self) -> Period {
        Period::new(self.granularity, self.reference)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    #[serde(rename(serialize = "Granularity"))]
    pub granularity: Granularity,
    #[serde(rename(serialize = "Label"))]
    pub label: String,
    #[serde(rename(serialize = "Range"))]
    pub range: DateRange,
    #[serde(rename(serialize = "Employees"))]
    pub rows: Vec<EmployeeHoursRow>,
}

pub struct Dashboard<S> {
    source: S,
    tz: Tz,
}

impl<S: WorkRecordSource> Dashboard<S> {
    pub fn new(source: S, tz: Tz) -> Self {
        Self { source, tz }
    }

    pub fn load(&self, state: &DashboardState) -> Result<DashboardView, Error> {
        let period = state.period();
        let range = period.range()?;
        let (start, end) = range.bounds(&self.tz)?;
        debug!("Loading {} day(s) from {} to {}", range.num_days(), start, end);

        let employees = self
            .source
            .fetch_employees()
            .context("Failed to fetch employees")?;
        let records = self
            .source
            .fetch_work_records(start, end)
            .with_context(|| format!("Failed to fetch work records from {} to {}", start, end))?;

        // the source may hand back more than the window, aggregate filters again
        let totals = aggregate(&records, start, end);

        Ok(DashboardView {
            granularity: state.granularity,
            label: period_label(&period)?,
            range,
            rows: dashboard_rows(&employees, &totals),
        })
    }
}
