//! Rules configuration.
//!
//! Every fixed amount the rules refer to lives here so a table can tweak
//! them from a JSON file or through `setoption` without touching the engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or editing a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Tunable amounts and limits used by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_rubles: i64,
    /// Paid to a player for every completed lap.
    pub lap_stipend: i64,
    pub gulag_fee: i64,
    pub bribe_minimum: i64,
    /// Rounds a voucher stays liable for the prisoner they released.
    pub voucher_rounds: u32,
    /// Turns served at which a prisoner is eliminated.
    pub gulag_timeout: u8,
    /// Turns added to an informer's sentence when the accused is innocent.
    pub inform_penalty_turns: u8,
    pub tribunal_bonus: i64,
    /// Paid by every player when someone lands on the Breadline.
    pub breadline_levy: i64,
    pub revolutionary_contribution: i64,
    pub party_dues: i64,
    pub hammer_lap_bonus: i64,
    pub tank_requisition: i64,
    pub ration_amount: i64,
    /// Bread Loaf holdings above this are confiscated at end of turn.
    pub bread_loaf_cap: i64,
    /// Most expensive property the Sickle may harvest.
    pub harvest_price_cap: i64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            starting_rubles: 1500,
            lap_stipend: 200,
            gulag_fee: 500,
            bribe_minimum: 200,
            voucher_rounds: 3,
            gulag_timeout: 10,
            inform_penalty_turns: 2,
            tribunal_bonus: 100,
            breadline_levy: 50,
            revolutionary_contribution: 200,
            party_dues: 100,
            hammer_lap_bonus: 50,
            tank_requisition: 50,
            ration_amount: 100,
            bread_loaf_cap: 1000,
            harvest_price_cap: 150,
        }
    }
}

impl RulesConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets a single option by its snake_case field name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue { name: name.to_string(), value: value.to_string() };
        match name {
            "gulag_timeout" | "inform_penalty_turns" => {
                let v: u8 = value.parse().map_err(|_| invalid())?;
                if name == "gulag_timeout" {
                    self.gulag_timeout = v;
                } else {
                    self.inform_penalty_turns = v;
                }
                return Ok(());
            }
            "voucher_rounds" => {
                self.voucher_rounds = value.parse().map_err(|_| invalid())?;
                return Ok(());
            }
            _ => {}
        }

        let amount: i64 = value.parse().map_err(|_| invalid())?;
        if amount < 0 {
            return Err(invalid());
        }
        let slot = match name {
            "starting_rubles" => &mut self.starting_rubles,
            "lap_stipend" => &mut self.lap_stipend,
            "gulag_fee" => &mut self.gulag_fee,
            "bribe_minimum" => &mut self.bribe_minimum,
            "tribunal_bonus" => &mut self.tribunal_bonus,
            "breadline_levy" => &mut self.breadline_levy,
            "revolutionary_contribution" => &mut self.revolutionary_contribution,
            "party_dues" => &mut self.party_dues,
            "hammer_lap_bonus" => &mut self.hammer_lap_bonus,
            "tank_requisition" => &mut self.tank_requisition,
            "ration_amount" => &mut self.ration_amount,
            "bread_loaf_cap" => &mut self.bread_loaf_cap,
            "harvest_price_cap" => &mut self.harvest_price_cap,
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        };
        *slot = amount;
        Ok(())
    }
}
