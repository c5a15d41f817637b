//! # Hero HTTP
//!
//! The request, response and session types the hero dependency injection core
//! talks to. Routing, transport and session storage live elsewhere; this crate
//! only carries the values a dispatcher needs to bind handler inputs.
//!
//! ## Example
//!
//! ```
//! use hero_http::{Request, Session};
//! use hyper::Method;
//!
//! let request = Request::builder()
//!     .method(Method::GET)
//!     .uri("/users/42?verbose=true")
//!     .path_param("id", "42")
//!     .build()
//!     .unwrap();
//!
//! Session::new().attach(&request);
//!
//! assert_eq!(request.path(), "/users/42");
//! assert_eq!(request.path_params.get("id"), Some("42"));
//! assert!(Session::from_request(&request).is_some());
//! ```

pub mod extensions;
pub mod handler;
pub mod params;
pub mod request;
pub mod response;
pub mod session;

pub use extensions::Extensions;
pub use handler::Handler;
pub use params::PathParams;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use session::Session;

use thiserror::Error;

/// Errors raised while building host values
#[derive(Debug, Error)]
pub enum Error {
	/// The request could not be assembled (bad URI, header name or value)
	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	/// A value could not be serialized into a body or a session entry
	#[error("Serialization error: {0}")]
	Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
