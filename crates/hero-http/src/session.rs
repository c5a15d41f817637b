//! Session handle
//!
//! Session storage (cookies, Redis, a database) is owned by middleware outside
//! this crate. The middleware loads the session, attaches a [`Session`] handle
//! to the request, and persists it after the handler ran. Handlers and
//! providers only see the handle.

use crate::{Error, Request, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Shared handle to the data of one session.
///
/// Clones point at the same data, so writes made by a handler are visible to
/// the middleware that attached the session.
///
/// # Examples
///
/// ```
/// use hero_http::Session;
///
/// let session = Session::new();
/// session.set("visits", 3u32).unwrap();
///
/// let other = session.clone();
/// assert_eq!(other.get::<u32>("visits"), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct Session {
	id: Arc<str>,
	data: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl Session {
	/// Create an empty session with a fresh random id
	pub fn new() -> Self {
		Self::with_id(Uuid::new_v4().to_string())
	}

	/// Create an empty session with a known id (loaded from a store)
	pub fn with_id(id: impl Into<String>) -> Self {
		Self {
			id: Arc::from(id.into()),
			data: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// Get a value, `None` if missing or not deserializable as `T`
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
		data.get(key)
			.and_then(|value| serde_json::from_value(value.clone()).ok())
	}

	pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<()> {
		let value = serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))?;
		let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
		data.insert(key.into(), value);
		Ok(())
	}

	pub fn delete(&self, key: &str) {
		let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
		data.remove(key);
	}

	pub fn contains_key(&self, key: &str) -> bool {
		let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
		data.contains_key(key)
	}

	pub fn clear(&self) {
		let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
		data.clear();
	}

	pub fn len(&self) -> usize {
		let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
		data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Attach this session to a request
	pub fn attach(&self, request: &Request) {
		request.extensions.insert(self.clone());
	}

	/// The session attached to a request, if session middleware ran
	pub fn from_request(request: &Request) -> Option<Session> {
		request.extensions.get::<Session>()
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}
