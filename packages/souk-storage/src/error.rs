#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("Store unavailable: {0}")]
	Unavailable(String),
}
