pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Cache error: {message}")]
	Cache { message: String },
}
impl From<relpost_storage::Error> for Error {
	fn from(err: relpost_storage::Error) -> Self {
		match err {
			relpost_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			relpost_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			relpost_storage::Error::NotFound(message) => Self::NotFound { message },
			relpost_storage::Error::Seed(message) => Self::Storage { message },
		}
	}
}
