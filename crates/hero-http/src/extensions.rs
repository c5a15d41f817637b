//! Type-keyed storage attached to a request
//!
//! Middleware uses it to hand values (a session, an authenticated user) to the
//! dependency injection layer without the request type knowing about them.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Type-keyed extension storage.
///
/// Clones share the same storage, so a value inserted through one clone of a
/// request is visible through every other clone.
#[derive(Clone, Default)]
pub struct Extensions {
	map: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Extensions {
	/// Create an empty storage
	///
	/// # Examples
	///
	/// ```
	/// use hero_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// assert!(extensions.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a value, replacing any previous value of the same type
	///
	/// # Examples
	///
	/// ```
	/// use hero_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// extensions.insert(42u32);
	/// extensions.insert(7u32);
	///
	/// assert_eq!(extensions.get::<u32>(), Some(7));
	/// ```
	pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.insert(TypeId::of::<T>(), Box::new(value));
	}

	/// Get a clone of the stored value of type `T`
	pub fn get<T>(&self) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.get(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast_ref::<T>())
			.cloned()
	}

	pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.contains_key(&TypeId::of::<T>())
	}

	/// Remove the value of type `T` and return it
	///
	/// # Examples
	///
	/// ```
	/// use hero_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// extensions.insert("token".to_string());
	///
	/// assert_eq!(extensions.remove::<String>(), Some("token".to_string()));
	/// assert_eq!(extensions.remove::<String>(), None);
	/// ```
	pub fn remove<T>(&self) -> Option<T>
	where
		T: Send + Sync + 'static,
	{
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.remove(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast::<T>().ok())
			.map(|value| *value)
	}

	pub fn clear(&self) {
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.clear();
	}

	pub fn len(&self) -> usize {
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl fmt::Debug for Extensions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Extensions")
			.field("len", &self.len())
			.finish()
	}
}
