//! Path parameter resolvers
//!
//! Inputs whose type has a resolver may be filled from the route's path
//! parameters, consumed by position.

use crate::input::{BoxValue, TypeKey};
use crate::{DiError, DiResult};
use hero_http::Request;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

type ParseFn = fn(&str) -> Result<BoxValue, String>;

/// Parser from a raw path segment into a typed value
#[derive(Debug, Clone, Copy)]
pub struct ParamResolver {
	key: TypeKey,
	parse: ParseFn,
}

impl ParamResolver {
	pub fn of<T>() -> Self
	where
		T: FromStr + Send + 'static,
		T::Err: Display,
	{
		Self {
			key: TypeKey::of::<T>(),
			parse: parse_as::<T>,
		}
	}

	pub fn key(&self) -> TypeKey {
		self.key
	}

	/// Parse the path parameter at `index`
	pub fn extract(&self, request: &Request, index: usize) -> DiResult<BoxValue> {
		let (name, raw) = request
			.path_params
			.get_entry_at(index)
			.ok_or(DiError::MissingParam {
				index,
				type_name: self.key.name(),
			})?;
		(self.parse)(raw).map_err(|message| DiError::InvalidParam {
			index,
			name: name.to_string(),
			type_name: self.key.name(),
			message,
		})
	}
}

fn parse_as<T>(raw: &str) -> Result<BoxValue, String>
where
	T: FromStr + Send + 'static,
	T::Err: Display,
{
	raw.parse::<T>()
		.map(|value| Box::new(value) as BoxValue)
		.map_err(|e| e.to_string())
}

/// Types that can be bound to path parameters
#[derive(Debug, Clone, Default)]
pub struct ParamResolvers {
	resolvers: HashMap<TypeId, ParamResolver>,
}

impl ParamResolvers {
	/// No parameter types at all
	pub fn new() -> Self {
		Self::default()
	}

	/// Strings, booleans, chars, integers and floats
	pub fn builtin() -> Self {
		let mut resolvers = Self::new();
		resolvers
			.register::<String>()
			.register::<bool>()
			.register::<char>()
			.register::<i8>()
			.register::<i16>()
			.register::<i32>()
			.register::<i64>()
			.register::<i128>()
			.register::<isize>()
			.register::<u8>()
			.register::<u16>()
			.register::<u32>()
			.register::<u64>()
			.register::<u128>()
			.register::<usize>()
			.register::<f32>()
			.register::<f64>();
		resolvers
	}

	pub fn register<T>(&mut self) -> &mut Self
	where
		T: FromStr + Send + 'static,
		T::Err: Display,
	{
		self.resolvers
			.insert(TypeId::of::<T>(), ParamResolver::of::<T>());
		self
	}

	pub fn get(&self, key: &TypeKey) -> Option<ParamResolver> {
		self.resolvers.get(&key.id()).copied()
	}

	pub fn contains(&self, key: &TypeKey) -> bool {
		self.resolvers.contains_key(&key.id())
	}

	pub fn len(&self) -> usize {
		self.resolvers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resolvers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request() -> Request {
		Request::builder()
			.uri("/users/42/posts/abc")
			.path_param("user_id", "42")
			.path_param("slug", "abc")
			.build()
			.unwrap()
	}

	#[rstest]
	fn parses_param_by_position() {
		// Arrange
		let resolver = ParamResolver::of::<u64>();

		// Act
		let value = resolver.extract(&request(), 0).unwrap();

		// Assert
		assert_eq!(*value.downcast::<u64>().unwrap(), 42);
	}

	#[rstest]
	fn invalid_param_names_the_segment() {
		// Arrange
		let resolver = ParamResolver::of::<u64>();

		// Act
		let error = resolver.extract(&request(), 1).unwrap_err();

		// Assert
		match error {
			DiError::InvalidParam { index, name, .. } => {
				assert_eq!(index, 1);
				assert_eq!(name, "slug");
			}
			other => panic!("expected InvalidParam, got {:?}", other),
		}
	}

	#[rstest]
	fn missing_param() {
		let error = ParamResolver::of::<String>()
			.extract(&request(), 2)
			.unwrap_err();
		assert!(matches!(error, DiError::MissingParam { index: 2, .. }));
	}

	#[rstest]
	#[case(TypeKey::of::<String>(), true)]
	#[case(TypeKey::of::<u32>(), true)]
	#[case(TypeKey::of::<f64>(), true)]
	#[case(TypeKey::of::<Vec<u8>>(), false)]
	fn builtin_types(#[case] key: TypeKey, #[case] expected: bool) {
		assert_eq!(ParamResolvers::builtin().contains(&key), expected);
	}

	#[rstest]
	fn custom_types_can_be_registered() {
		// Arrange
		#[derive(Debug, PartialEq)]
		struct Slug(String);

		impl FromStr for Slug {
			type Err = String;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Slug(s.to_string()))
			}
		}

		let mut resolvers = ParamResolvers::new();

		// Act
		resolvers.register::<Slug>();

		// Assert
		let resolver = resolvers.get(&TypeKey::of::<Slug>()).unwrap();
		let value = resolver.extract(&request(), 1).unwrap();
		assert_eq!(*value.downcast::<Slug>().unwrap(), Slug("abc".into()));
	}
}
