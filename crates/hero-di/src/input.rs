//! Type identity and input descriptions

use crate::{DiError, DiResult};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A value travelling between providers and targets.
///
/// Bindings produce values of the exact type the input declares; the target
/// downcasts them back with [`take_value`].
pub type BoxValue = Box<dyn Any + Send>;

/// Runtime identity of a type, with its name kept for diagnostics
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// # Examples
	///
	/// ```
	/// use hero_di::TypeKey;
	///
	/// assert_eq!(TypeKey::of::<u64>(), TypeKey::of::<u64>());
	/// assert_ne!(TypeKey::of::<u64>(), TypeKey::of::<i64>());
	/// assert_eq!(TypeKey::of::<String>().name(), "alloc::string::String");
	/// ```
	pub fn of<T: Any + ?Sized>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// One input of a target: a function parameter or a struct field.
///
/// `index` is the declaration position and stays stable when a sorter
/// reorders inputs for binding.
#[derive(Debug, Clone)]
pub struct Input {
	pub index: usize,
	pub key: TypeKey,
	pub name: Option<&'static str>,
}

impl Input {
	pub fn new(index: usize, key: TypeKey) -> Self {
		Self {
			index,
			key,
			name: None,
		}
	}

	pub fn field(index: usize, name: &'static str, key: TypeKey) -> Self {
		Self {
			index,
			key,
			name: Some(name),
		}
	}
}

impl fmt::Display for Input {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name {
			Some(name) => write!(f, "#{} {}: {}", self.index, name, self.key),
			None => write!(f, "#{} {}", self.index, self.key),
		}
	}
}

/// Take the next value and downcast it to `T`
///
/// # Examples
///
/// ```
/// use hero_di::{BoxValue, take_value};
///
/// let values: Vec<BoxValue> = vec![Box::new(7u8), Box::new("x".to_string())];
/// let mut values = values.into_iter();
///
/// assert_eq!(take_value::<u8>(&mut values).unwrap(), 7);
/// assert!(take_value::<u8>(&mut values).is_err());
/// ```
pub fn take_value<T: Any>(values: &mut impl Iterator<Item = BoxValue>) -> DiResult<T> {
	let mismatch = || DiError::TypeMismatch {
		expected: std::any::type_name::<T>(),
	};
	let value = values.next().ok_or_else(mismatch)?;
	value.downcast::<T>().map(|value| *value).map_err(|_| mismatch())
}

/// Clone a type-erased value of type `T`
pub(crate) fn clone_value<T: Any + Send + Clone>(value: &(dyn Any + Send)) -> Option<BoxValue> {
	value
		.downcast_ref::<T>()
		.map(|value| Box::new(value.clone()) as BoxValue)
}
