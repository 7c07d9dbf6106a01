use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub nlp: Nlp,
	#[serde(default)]
	pub signals: Signals,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Nlp {
	/// Tokens of this length or shorter are dropped during query cleaning.
	#[serde(default = "default_min_token_length")]
	pub min_token_length: usize,
	#[serde(default = "default_max_keywords")]
	pub max_keywords: usize,
}
impl Default for Nlp {
	fn default() -> Self {
		Self { min_token_length: default_min_token_length(), max_keywords: default_max_keywords() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Signals {
	/// Interactions older than this window contribute nothing to session weights.
	#[serde(default = "default_decay_window_hours")]
	pub decay_window_hours: f64,
	#[serde(default = "default_recent_limit")]
	pub default_recent_limit: u32,
	#[serde(default = "default_kind_scan_limit")]
	pub kind_scan_limit: u32,
}
impl Default for Signals {
	fn default() -> Self {
		Self {
			decay_window_hours: default_decay_window_hours(),
			default_recent_limit: default_recent_limit(),
			kind_scan_limit: default_kind_scan_limit(),
		}
	}
}

fn default_min_token_length() -> usize {
	2
}

fn default_max_keywords() -> usize {
	5
}

fn default_decay_window_hours() -> f64 {
	24.0
}

fn default_recent_limit() -> u32 {
	20
}

fn default_kind_scan_limit() -> u32 {
	100
}
