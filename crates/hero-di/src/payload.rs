//! Request body decoding for payload dependencies

use crate::{DiError, DiResult};
use hero_http::Request;
use hyper::Method;
use serde::de::DeserializeOwned;

/// Default maximum body size: 2 MiB
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Decode the request into `T`.
///
/// GET and HEAD requests, and requests without a body, decode the query
/// string. Otherwise the body is decoded according to its content type:
/// JSON (the default when no type is given) or URL-encoded form data.
pub fn decode<T: DeserializeOwned>(request: &Request, limit: usize) -> DiResult<T> {
	if request.body.len() > limit {
		return Err(DiError::PayloadTooLarge {
			size: request.body.len(),
			limit,
		});
	}

	if request.method == Method::GET || request.method == Method::HEAD || request.body.is_empty() {
		let query = request.query_string().unwrap_or("");
		return serde_urlencoded::from_str(query).map_err(|e| DiError::Payload(e.to_string()));
	}

	match request.content_type().as_deref() {
		None | Some("application/json") => from_json(request),
		Some(media) if media.ends_with("+json") => from_json(request),
		Some("application/x-www-form-urlencoded") => {
			serde_urlencoded::from_bytes(&request.body).map_err(|e| DiError::Payload(e.to_string()))
		}
		Some(media) => Err(DiError::UnsupportedMediaType(media.to_string())),
	}
}

fn from_json<T: DeserializeOwned>(request: &Request) -> DiResult<T> {
	serde_json::from_slice(&request.body).map_err(|e| DiError::Payload(e.to_string()))
}
