//! Path parameters extracted by a router

/// Ordered path parameters.
///
/// Routers push parameters in the order they appear in the route pattern.
/// Positional binding relies on that order, so lookups by index are as
/// important as lookups by name.
///
/// # Examples
///
/// ```
/// use hero_http::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("user_id", "7");
/// params.push("post_id", "99");
///
/// assert_eq!(params.get("post_id"), Some("99"));
/// assert_eq!(params.get_entry_at(0), Some(("user_id", "7")));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
	entries: Vec<(String, String)>,
}

impl PathParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a parameter. A name that already exists is overwritten in place
	/// so its position is kept.
	pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(key, _)| *key == name) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((name, value)),
		}
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Get the `(name, value)` pair at a position
	pub fn get_entry_at(&self, index: usize) -> Option<(&str, &str)> {
		self.entries
			.get(index)
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = PathParams::new();
		for (name, value) in iter {
			params.push(name, value);
		}
		params
	}
}
