use std::path::PathBuf;

use anyhow::{anyhow, Error};
use chrono_tz::Tz;
use serde::Deserialize;

const ENV_PREFIX: &str = "WORK_HOURS_";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub records_path: Option<PathBuf>,
    pub employees_path: Option<PathBuf>,
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();
        envy::prefixed(ENV_PREFIX).from_env::<Config>()
    }

    pub fn time_zone(&self) -> Result<Tz, Error> {
        parse_time_zone(&self.timezone)
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, Error> {
    name.trim()
        .parse::<Tz>()
        .map_err(|err| anyhow!("unknown time zone {:?}: {}", name, err))
}
