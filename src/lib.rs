pub mod byes;
pub mod cartesian;
pub mod error;
pub mod generator;
pub mod logging;
pub mod pairs;
pub mod scheduler;
pub mod search;
pub mod summary;
pub mod types;

pub use error::SchedulerError;
pub use scheduler::Scheduler;
pub use summary::{summarize, NamedSummary, ScheduleSummary};
pub use types::*;

use log::LevelFilter;
use search::optimization_trials;
use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Warn);
}

fn to_js(err: SchedulerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed scheduler wrapper
#[wasm_bindgen]
pub struct SchedulerEngine {
    scheduler: Scheduler,
    last: Option<OptimizedSchedule>,
}

impl SchedulerEngine {
    fn from_config(config: SchedulerConfig) -> error::Result<SchedulerEngine> {
        Ok(SchedulerEngine {
            scheduler: Scheduler::new(config)?,
            last: None,
        })
    }

    fn summary_json(&self) -> error::Result<String> {
        let Some(optimal) = &self.last else {
            return Ok("null".to_string());
        };
        let summary = optimal.summary()?;
        match self.scheduler.player_names() {
            Some(names) => Ok(serde_json::to_string(&summary.named(names)?)?),
            None => Ok(serde_json::to_string(&summary)?),
        }
    }
}

#[wasm_bindgen]
impl SchedulerEngine {
    /// Create from a JSON `SchedulerConfig`
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<SchedulerEngine, JsValue> {
        let config = SchedulerConfig::from_json(config_json).map_err(to_js)?;
        Self::from_config(config).map_err(to_js)
    }

    /// Create from either an array of player names or a player count
    pub fn from_players(
        players: JsValue,
        n_rounds: usize,
        n_courts: usize,
        iterations: usize,
    ) -> Result<SchedulerEngine, JsValue> {
        let config = SchedulerConfig::new(n_rounds, n_courts).with_iterations(iterations);
        let config = if js_sys::Array::is_array(&players) {
            let names = js_sys::Array::from(&players)
                .iter()
                .map(|name| {
                    name.as_string()
                        .ok_or_else(|| SchedulerError::InvalidPlayerNames(format!("{:?}", name)))
                })
                .collect::<error::Result<Vec<String>>>()
                .map_err(to_js)?;
            config.with_player_names(names)
        } else if let Some(n) = players.as_f64().filter(|n| *n >= 0.0 && n.fract() == 0.0) {
            config.with_players(n as usize)
        } else {
            return Err(to_js(SchedulerError::InvalidPlayerNames(format!("{:?}", players))));
        };
        Self::from_config(config).map_err(to_js)
    }

    /// Run the search and return the chosen schedule as JSON
    pub fn optimize(&mut self) -> Result<String, JsValue> {
        let optimal = self.scheduler.optimize_schedule().map_err(to_js)?;
        let json = serde_json::to_string(&optimal).map_err(|e| to_js(e.into()))?;
        self.last = Some(optimal);
        Ok(json)
    }

    /// Get byes per round as JSON
    pub fn get_byes(&self) -> Result<String, JsValue> {
        let byes = self.scheduler.calculate_byes().map_err(to_js)?;
        serde_json::to_string(&byes).map_err(|e| to_js(e.into()))
    }

    /// Per-player duplicate summary of the last optimized schedule, `null` before
    /// the first `optimize` call
    pub fn get_summary(&self) -> Result<String, JsValue> {
        self.summary_json().map_err(to_js)
    }

    pub fn get_player_count(&self) -> usize {
        self.scheduler.n_players()
    }

    /// Get config as JSON
    pub fn get_config(&self) -> String {
        serde_json::to_string(self.scheduler.config()).unwrap_or_default()
    }
}

/// Optimize a schedule described by a JSON config, returning JSON
pub fn optimize_schedule_json(config_json: &str) -> error::Result<String> {
    let config = SchedulerConfig::from_json(config_json)?;
    let optimal = Scheduler::new(config)?.optimize_schedule()?;
    Ok(serde_json::to_string(&optimal)?)
}

/// Byes per round for a JSON config, returning JSON
pub fn calculate_byes_json(config_json: &str) -> error::Result<String> {
    let config = SchedulerConfig::from_json(config_json)?;
    let byes = Scheduler::new(config)?.calculate_byes()?;
    Ok(serde_json::to_string(&byes)?)
}

/// Repeat an optimization `trials` times, returning per-trial results as JSON
pub fn run_trials_json(config_json: &str, trials: usize) -> error::Result<String> {
    let config = SchedulerConfig::from_json(config_json)?;
    let results = optimization_trials(&config, trials)?;
    Ok(serde_json::to_string(&results)?)
}

#[wasm_bindgen]
pub fn optimize_schedule(config_json: &str) -> Result<String, JsValue> {
    optimize_schedule_json(config_json).map_err(to_js)
}

#[wasm_bindgen]
pub fn calculate_byes(config_json: &str) -> Result<String, JsValue> {
    calculate_byes_json(config_json).map_err(to_js)
}

#[wasm_bindgen]
pub fn run_trials(config_json: &str, trials: usize) -> Result<String, JsValue> {
    run_trials_json(config_json, trials).map_err(to_js)
}

/// Change console log verbosity ("off" through "trace")
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logging::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    logging::init(filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_schedule_json() {
        let json = optimize_schedule_json(
            r#"{"n_players": 10, "n_rounds": 4, "n_courts": 2, "iterations": 100, "seed": 12}"#,
        )
        .unwrap();
        let optimal: OptimizedSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(optimal.n_rounds(), 4);
        assert_eq!(optimal.n_courts(), 2);
        assert_eq!(optimal.byes, vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]);
    }

    #[test]
    fn test_optimize_schedule_json_errors() {
        assert!(matches!(
            optimize_schedule_json(r#"{"n_rounds": 4, "n_courts": 2}"#),
            Err(SchedulerError::MissingPlayers)
        ));
        assert!(matches!(
            optimize_schedule_json(r#"{"player_names": "Joe", "n_rounds": 4, "n_courts": 2}"#),
            Err(SchedulerError::InvalidPlayerNames(_))
        ));
        assert!(matches!(
            optimize_schedule_json(r#"{"n_players": 10, "n_rounds": 4, "n_courts": 2, "iterations": 0}"#),
            Err(SchedulerError::Configuration(_))
        ));
        assert!(matches!(
            optimize_schedule_json("not json"),
            Err(SchedulerError::Json(_))
        ));
    }

    #[test]
    fn test_calculate_byes_json() {
        let json = calculate_byes_json(r#"{"n_players": 13, "n_rounds": 3, "n_courts": 3}"#).unwrap();
        assert_eq!(json, "[[0],[1],[2]]");
    }

    #[test]
    fn test_run_trials_json() {
        let json = run_trials_json(
            r#"{"n_players": 9, "n_rounds": 3, "n_courts": 2, "iterations": 20, "seed": 4}"#,
            3,
        )
        .unwrap();
        let trials: Vec<search::TrialResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(trials.len(), 3);
    }

    #[test]
    fn test_engine_summary_uses_names() {
        let mut engine = SchedulerEngine::from_config(
            SchedulerConfig::new(3, 1)
                .with_player_names(["Joe", "Tom", "Steve", "Bill", "Tammy"])
                .with_iterations(50)
                .with_seed(9),
        )
        .unwrap();
        assert_eq!(engine.summary_json().unwrap(), "null");

        engine.optimize().unwrap();
        let named: NamedSummary = serde_json::from_str(&engine.summary_json().unwrap()).unwrap();
        assert_eq!(named.partner_duplicates.len(), 5);
        assert!(named.partner_duplicates.contains_key("Tammy"));
    }
}
