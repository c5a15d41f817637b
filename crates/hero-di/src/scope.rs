//! Dependency lifetimes and the per-request resolution state

use crate::input::BoxValue;
use hero_http::Request;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// How long a provided value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyScope {
	/// Computed once when the container is built, cloned for every input
	Static,
	/// Computed at most once per request and shared by every input of it
	Request,
	/// Computed again for every input that needs it
	Transient,
}

/// Identity of a registered dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyId(u64);

impl DependencyId {
	pub(crate) fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		DependencyId(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

pub(crate) type Cloner = fn(&(dyn Any + Send)) -> Option<BoxValue>;

/// Values of request-scoped dependencies computed so far
#[derive(Default)]
pub struct RequestScope {
	cache: HashMap<DependencyId, BoxValue>,
}

impl RequestScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn get(&self, id: DependencyId, cloner: Cloner) -> Option<BoxValue> {
		self.cache.get(&id).and_then(|value| cloner(value.as_ref()))
	}

	pub(crate) fn set(&mut self, id: DependencyId, value: BoxValue) {
		self.cache.insert(id, value);
	}

	pub fn contains(&self, id: DependencyId) -> bool {
		self.cache.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.cache.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cache.is_empty()
	}

	pub fn clear(&mut self) {
		self.cache.clear();
	}
}

/// State of one resolution pass over a request
pub struct Resolver<'r> {
	request: &'r Request,
	scope: RequestScope,
}

impl<'r> Resolver<'r> {
	pub fn new(request: &'r Request) -> Self {
		Self {
			request,
			scope: RequestScope::new(),
		}
	}

	pub fn request(&self) -> &'r Request {
		self.request
	}

	pub fn scope(&self) -> &RequestScope {
		&self.scope
	}

	pub fn scope_mut(&mut self) -> &mut RequestScope {
		&mut self.scope
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::input::clone_value;
	use rstest::rstest;

	#[rstest]
	fn scope_returns_copies() {
		// Arrange
		let mut scope = RequestScope::new();
		let id = DependencyId::next();
		scope.set(id, Box::new(String::from("cached")));

		// Act
		let first = scope.get(id, clone_value::<String>).unwrap();
		let second = scope.get(id, clone_value::<String>).unwrap();

		// Assert
		assert_eq!(*first.downcast::<String>().unwrap(), "cached");
		assert_eq!(*second.downcast::<String>().unwrap(), "cached");
		assert!(scope.contains(id));
	}

	#[rstest]
	fn wrong_cloner_misses() {
		// Arrange
		let mut scope = RequestScope::new();
		let id = DependencyId::next();
		scope.set(id, Box::new(1u32));

		// Act & Assert
		assert!(scope.get(id, clone_value::<u64>).is_none());
	}

	#[rstest]
	fn ids_are_unique() {
		assert_ne!(DependencyId::next(), DependencyId::next());
	}
}
