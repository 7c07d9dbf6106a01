mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Nlp, Postgres, Service, Signals, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.nlp.max_keywords == 0 {
		return Err(Error::Validation {
			message: "nlp.max_keywords must be greater than zero.".to_string(),
		});
	}
	if !cfg.signals.decay_window_hours.is_finite() {
		return Err(Error::Validation {
			message: "signals.decay_window_hours must be a finite number.".to_string(),
		});
	}
	if cfg.signals.decay_window_hours <= 0.0 {
		return Err(Error::Validation {
			message: "signals.decay_window_hours must be greater than zero.".to_string(),
		});
	}
	if cfg.signals.default_recent_limit == 0 {
		return Err(Error::Validation {
			message: "signals.default_recent_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.signals.kind_scan_limit == 0 {
		return Err(Error::Validation {
			message: "signals.kind_scan_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
