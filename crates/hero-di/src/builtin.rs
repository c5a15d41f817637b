//! Dependencies every container starts with

use crate::dependency::Dependency;
use crate::DiError;
use hero_http::{Request, Session};
use std::time::SystemTime;

/// The request, its parts, the session and the current time.
///
/// Resolving [`Session`] fails with [`DiError::SessionMissing`] when no
/// session middleware attached one.
pub fn builtin_dependencies() -> Vec<Dependency> {
	vec![
		Dependency::from_request(|request: &Request| Ok(request.clone())).named("request"),
		Dependency::from_request(|request: &Request| Ok(request.method.clone())).named("method"),
		Dependency::from_request(|request: &Request| Ok(request.uri.clone())).named("uri"),
		Dependency::from_request(|request: &Request| Ok(request.headers.clone())).named("headers"),
		Dependency::from_request(|request: &Request| Ok(request.path_params.clone()))
			.named("path params"),
		Dependency::from_request(|request: &Request| {
			Session::from_request(request).ok_or(DiError::SessionMissing)
		})
		.named("session"),
		Dependency::from_request(|_: &Request| Ok(SystemTime::now())).named("time"),
	]
}
