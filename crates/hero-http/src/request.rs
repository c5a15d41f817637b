//! HTTP request as seen by handlers and providers

use crate::{Error, Extensions, PathParams, Result};
use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, Uri, Version};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// HTTP request representation.
///
/// Cloning is cheap: the body is reference counted and extensions are shared.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub path_params: PathParams,
	pub extensions: Extensions,
}

impl Request {
	/// Create a request from its raw parts
	///
	/// # Examples
	///
	/// ```
	/// use hero_http::Request;
	/// use hyper::{HeaderMap, Method, Uri, Version};
	/// use bytes::Bytes;
	///
	/// let request = Request::new(
	///     Method::POST,
	///     Uri::from_static("/items"),
	///     Version::HTTP_11,
	///     HeaderMap::new(),
	///     Bytes::from_static(b"{}"),
	/// );
	/// assert_eq!(request.method, Method::POST);
	/// assert!(request.path_params.is_empty());
	/// ```
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: PathParams::new(),
			extensions: Extensions::new(),
		}
	}

	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn query_string(&self) -> Option<&str> {
		self.uri.query()
	}

	/// URL-decoded query parameters
	///
	/// Only the first `=` splits key from value, so encoded payloads such as
	/// Base64 keep their padding.
	///
	/// # Examples
	///
	/// ```
	/// use hero_http::Request;
	///
	/// let request = Request::builder()
	///     .uri("/search?q=hello%20world&token=YQ==")
	///     .build()
	///     .unwrap();
	///
	/// let params = request.query_params();
	/// assert_eq!(params.get("q"), Some(&"hello world".to_string()));
	/// assert_eq!(params.get("token"), Some(&"YQ==".to_string()));
	/// ```
	pub fn query_params(&self) -> HashMap<String, String> {
		self.query_string()
			.map(|query| {
				query
					.split('&')
					.filter(|pair| !pair.is_empty())
					.filter_map(|pair| {
						let mut parts = pair.splitn(2, '=');
						let key = parts.next()?;
						let value = parts.next().unwrap_or("");
						Some((decode(key), decode(value)))
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Media type of the body, lower-cased and without parameters
	///
	/// # Examples
	///
	/// ```
	/// use hero_http::Request;
	///
	/// let request = Request::builder()
	///     .header("content-type", "Application/JSON; charset=utf-8")
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.content_type().as_deref(), Some("application/json"));
	/// ```
	pub fn content_type(&self) -> Option<String> {
		self.headers
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.split(';').next())
			.map(|media| media.trim().to_ascii_lowercase())
			.filter(|media| !media.is_empty())
	}

	/// Set a path parameter (used by routers after matching a pattern)
	pub fn set_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.path_params.push(name, value);
	}
}

/// Form decoding: `+` is a space, `%2B` a literal plus
fn decode(raw: &str) -> String {
	let spaced = raw.replace('+', " ");
	percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Builder for [`Request`].
///
/// Invalid parts are remembered and reported by [`RequestBuilder::build`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Method,
	uri: Uri,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	path_params: PathParams,
	error: Option<String>,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl AsRef<str>) -> Self {
		match uri.as_ref().parse::<Uri>() {
			Ok(uri) => self.uri = uri,
			Err(e) => self.record(format!("invalid uri `{}`: {}", uri.as_ref(), e)),
		}
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn header(mut self, name: &str, value: &str) -> Self {
		let name_parsed = HeaderName::from_bytes(name.as_bytes());
		let value_parsed = HeaderValue::from_str(value);
		match (name_parsed, value_parsed) {
			(Ok(name), Ok(value)) => {
				self.headers.append(name, value);
			}
			_ => self.record(format!("invalid header `{}: {}`", name, value)),
		}
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.path_params.push(name, value);
		self
	}

	pub fn build(self) -> Result<Request> {
		if let Some(error) = self.error {
			return Err(Error::InvalidRequest(error));
		}
		let mut request = Request::new(self.method, self.uri, self.version, self.headers, self.body);
		request.path_params = self.path_params;
		Ok(request)
	}

	fn record(&mut self, error: String) {
		if self.error.is_none() {
			self.error = Some(error);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn builder_defaults() {
		// Act
		let request = Request::builder().build().unwrap();

		// Assert
		assert_eq!(request.method, Method::GET);
		assert_eq!(request.path(), "/");
		assert_eq!(request.version, Version::HTTP_11);
		assert!(request.body.is_empty());
	}

	#[rstest]
	fn builder_reports_first_invalid_part() {
		// Act
		let result = Request::builder()
			.uri("/bad path")
			.header("bad header", "x")
			.build();

		// Assert
		match result {
			Err(Error::InvalidRequest(message)) => assert!(message.contains("invalid uri")),
			other => panic!("expected InvalidRequest, got {:?}", other),
		}
	}

	#[rstest]
	#[case("/a?x=1&y=", "y", Some(""))]
	#[case("/a?flag", "flag", Some(""))]
	#[case("/a?name=J%C3%BCrgen", "name", Some("Jürgen"))]
	#[case("/a?q=hello+world", "q", Some("hello world"))]
	#[case("/a?sum=1%2B1", "sum", Some("1+1"))]
	#[case("/a", "x", None)]
	fn query_parameter_decoding(
		#[case] uri: &str,
		#[case] key: &str,
		#[case] expected: Option<&str>,
	) {
		// Arrange
		let request = Request::builder().uri(uri).build().unwrap();

		// Act
		let params = request.query_params();

		// Assert
		assert_eq!(params.get(key).map(String::as_str), expected);
	}

	#[rstest]
	fn clones_share_extensions() {
		// Arrange
		let request = Request::builder().build().unwrap();
		let clone = request.clone();

		// Act
		clone.extensions.insert(3u16);

		// Assert
		assert_eq!(request.extensions.get::<u16>(), Some(3));
	}
}
