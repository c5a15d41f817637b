//! Errors raised while binding and dispatching

use hero_http::Response;
use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiError {
	/// Some inputs of a handler, provider or struct have no provider
	#[error(
		"{target}: expected [{expected}] bindings (input parameters) but got [{got}]; missing: {}",
		.missing.join(", ")
	)]
	Unresolved {
		target: String,
		expected: usize,
		got: usize,
		missing: Vec<String>,
	},

	#[error("Invalid dependency: {0}")]
	InvalidDependency(String),

	/// A provider function was resolved before its inputs were bound
	#[error("Dependency `{0}` is not bound to a container")]
	Unbound(String),

	#[error("Type mismatch: expected a value of type `{expected}`")]
	TypeMismatch { expected: &'static str },

	#[error("Path parameter #{index} ({type_name}) is missing")]
	MissingParam {
		index: usize,
		type_name: &'static str,
	},

	#[error("Path parameter `{name}` (#{index}) is not a valid {type_name}: {message}")]
	InvalidParam {
		index: usize,
		name: String,
		type_name: &'static str,
		message: String,
	},

	#[error("Session is missing: attach a session to the request before dispatching")]
	SessionMissing,

	#[error("Payload error: {0}")]
	Payload(String),

	#[error("Payload too large: {size} bytes exceeds the limit of {limit} bytes")]
	PayloadTooLarge { size: usize, limit: usize },

	#[error("Unsupported media type: {0}")]
	UnsupportedMediaType(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error(transparent)]
	Http(#[from] hero_http::Error),

	#[error("Invalid settings: {0}")]
	Settings(String),

	/// Error with an explicit HTTP status, raised by providers or handlers
	#[error("{message}")]
	Status { status: StatusCode, message: String },

	/// Error returned by a fallible provider
	#[error("{0}")]
	Provider(Box<dyn std::error::Error + Send + Sync>),

	/// Stop the request and send this response as is
	#[error("Execution stopped with status {}", .0.status)]
	Halt(Box<Response>),
}

pub type DiResult<T> = std::result::Result<T, DiError>;

impl DiError {
	/// Stop dispatching and answer with `response`
	///
	/// # Examples
	///
	/// ```
	/// use hero_di::{DiError, Response};
	/// use hyper::StatusCode;
	///
	/// let error = DiError::halt(Response::unauthorized());
	/// assert!(error.is_halt());
	/// assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
	/// ```
	pub fn halt(response: Response) -> Self {
		DiError::Halt(Box::new(response))
	}

	pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
		DiError::Status {
			status,
			message: message.into(),
		}
	}

	pub fn provider<E>(error: E) -> Self
	where
		E: Into<Box<dyn std::error::Error + Send + Sync>>,
	{
		DiError::Provider(error.into())
	}

	pub fn is_halt(&self) -> bool {
		matches!(self, DiError::Halt(_))
	}

	/// HTTP status used when the error reaches the client
	pub fn status_code(&self) -> StatusCode {
		match self {
			DiError::MissingParam { .. }
			| DiError::InvalidParam { .. }
			| DiError::Payload(_)
			| DiError::Provider(_) => StatusCode::BAD_REQUEST,
			DiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
			DiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			DiError::Status { status, .. } => *status,
			DiError::Halt(response) => response.status,
			DiError::Unresolved { .. }
			| DiError::InvalidDependency(_)
			| DiError::Unbound(_)
			| DiError::TypeMismatch { .. }
			| DiError::SessionMissing
			| DiError::Serialization(_)
			| DiError::Http(_)
			| DiError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<toml::de::Error> for DiError {
	fn from(error: toml::de::Error) -> Self {
		DiError::Settings(error.to_string())
	}
}
