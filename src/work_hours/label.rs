use crate::work_hours::period::{Granularity, InvalidDateError, Period};

use chrono::{Datelike, NaiveDate};

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

pub fn period_label(period: &Period) -> Result<String, InvalidDateError> {
    let reference = period.reference;
    Ok(match period.granularity {
        Granularity::Day => format!(
            "{} {} {}",
            reference.day(),
            month_name(reference),
            reference.year()
        ),
        Granularity::Week => {
            let range = period.range()?;
            format!(
                "{} - {}",
                range.start.format("%d/%m/%Y"),
                range.end.format("%d/%m/%Y")
            )
        }
        Granularity::Month => format!("{} {}", month_name(reference), reference.year()),
    })
}

pub fn format_hours(hours: f64) -> String {
    // round half away from zero, `{:.1}` alone would round 2.25 down to 2.2
    format!("{:.1} heures", (hours * 10.).round() / 10.)
}

fn month_name(date: NaiveDate) -> &'static str {
    MONTHS_FR[date.month0() as usize]
}
