//! Conversion of handler results into responses

use crate::{DiError, DiResult};
use hero_http::Response;
use hyper::StatusCode;
use serde::Serialize;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Handler output that can be sent to the client
pub trait Reply {
	fn into_reply(self) -> DiResult<Response>;
}

/// Serialize the inner value as a JSON body
///
/// # Examples
///
/// ```
/// use hero_di::{Json, Reply};
///
/// let response = Json(vec![1, 2, 3]).into_reply().unwrap();
/// assert_eq!(response.body_text(), "[1,2,3]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl Reply for Response {
	fn into_reply(self) -> DiResult<Response> {
		Ok(self)
	}
}

impl Reply for () {
	fn into_reply(self) -> DiResult<Response> {
		Ok(Response::ok())
	}
}

impl Reply for StatusCode {
	fn into_reply(self) -> DiResult<Response> {
		Ok(Response::new(self))
	}
}

impl Reply for String {
	fn into_reply(self) -> DiResult<Response> {
		(StatusCode::OK, self).into_reply()
	}
}

impl Reply for &'static str {
	fn into_reply(self) -> DiResult<Response> {
		(StatusCode::OK, self).into_reply()
	}
}

impl Reply for (StatusCode, String) {
	fn into_reply(self) -> DiResult<Response> {
		Ok(Response::new(self.0)
			.with_header("content-type", TEXT_PLAIN)
			.with_body(self.1))
	}
}

impl Reply for (StatusCode, &'static str) {
	fn into_reply(self) -> DiResult<Response> {
		(self.0, self.1.to_string()).into_reply()
	}
}

impl Reply for serde_json::Value {
	fn into_reply(self) -> DiResult<Response> {
		Json(self).into_reply()
	}
}

impl<T: Serialize> Reply for Json<T> {
	fn into_reply(self) -> DiResult<Response> {
		Ok(Response::ok().with_json(&self.0)?)
	}
}

/// `None` is answered with 404
impl<T: Reply> Reply for Option<T> {
	fn into_reply(self) -> DiResult<Response> {
		match self {
			Some(value) => value.into_reply(),
			None => Ok(Response::not_found()),
		}
	}
}

impl<T, E> Reply for Result<T, E>
where
	T: Reply,
	E: Into<DiError>,
{
	fn into_reply(self) -> DiResult<Response> {
		self.map_err(Into::into)?.into_reply()
	}
}
