//! Configuration loading and representation.

use anyhow::{Context, Result};
use std::env;

use tenderflow_bids::{QuorumPolicy, RejectionRule};
use tenderflow_observability::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Decision quorum (`TENDERFLOW_QUORUM_MAX`, `TENDERFLOW_REJECTION_RULE`).
    pub quorum: QuorumPolicy,

    /// Close the tender once one of its bids is approved.
    pub close_tender_on_approval: bool,

    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quorum: QuorumPolicy::default(),
            close_tender_on_approval: true,
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Read settings from the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let max_threshold = match lookup("TENDERFLOW_QUORUM_MAX") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TENDERFLOW_QUORUM_MAX must be a positive integer, got '{raw}'"))?,
            None => defaults.quorum.max_threshold,
        };

        let rejection = match lookup("TENDERFLOW_REJECTION_RULE") {
            Some(raw) => raw
                .parse::<RejectionRule>()
                .context("invalid TENDERFLOW_REJECTION_RULE")?,
            None => defaults.quorum.rejection,
        };

        let quorum = QuorumPolicy::new(max_threshold, rejection).context("invalid quorum policy")?;

        let close_tender_on_approval = match lookup("TENDERFLOW_CLOSE_TENDER_ON_APPROVAL") {
            Some(raw) => parse_bool(&raw).with_context(|| {
                format!("TENDERFLOW_CLOSE_TENDER_ON_APPROVAL must be a boolean, got '{raw}'")
            })?,
            None => defaults.close_tender_on_approval,
        };

        let log_format = match lookup("TENDERFLOW_LOG_FORMAT") {
            Some(raw) => raw.parse().context("invalid TENDERFLOW_LOG_FORMAT")?,
            None => defaults.log_format,
        };

        Ok(Self {
            quorum,
            close_tender_on_approval,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
