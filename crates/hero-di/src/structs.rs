//! Struct injection
//!
//! A struct whose fields are all injectable is built the same way a handler
//! is called: each field is an input bound to a dependency or a path
//! parameter. When every field is static a single instance is built up
//! front and shared.

use crate::binding::{Binding, ParamStart, Plan, bindings_for};
use crate::container::Container;
use crate::input::{BoxValue, Input, TypeKey};
use crate::scope::Resolver;
use crate::DiResult;
use hero_http::Request;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// One injectable field
#[derive(Debug, Clone, Copy)]
pub struct Field {
	pub name: &'static str,
	pub key: TypeKey,
}

impl Field {
	pub fn new<T: Any>(name: &'static str) -> Self {
		Self {
			name,
			key: TypeKey::of::<T>(),
		}
	}
}

/// A struct built from injected fields.
///
/// Usually implemented with [`injectable!`](crate::injectable).
pub trait Injectable: Sized + Send + Sync + 'static {
	/// Fields in declaration order
	fn fields() -> Vec<Field>;

	/// Build from one value per field, in declaration order
	fn assemble(values: Vec<BoxValue>) -> DiResult<Self>;
}

/// Declare a struct whose fields are injected.
///
/// # Examples
///
/// ```
/// use hero_di::{Container, injectable};
///
/// #[derive(Clone)]
/// pub struct Db(&'static str);
///
/// injectable! {
///     pub struct UserController {
///         pub db: Db,
///     }
/// }
///
/// let mut container = Container::empty();
/// container.register_value(Db("postgres")).unwrap();
///
/// let controller = container.struct_of::<UserController>().unwrap();
/// assert!(controller.is_singleton());
/// ```
#[macro_export]
macro_rules! injectable {
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident {
			$($field_vis:vis $field:ident : $ty:ty),* $(,)?
		}
	) => {
		$(#[$meta])*
		$vis struct $name {
			$($field_vis $field: $ty,)*
		}

		impl $crate::Injectable for $name {
			fn fields() -> ::std::vec::Vec<$crate::Field> {
				::std::vec![$($crate::Field::new::<$ty>(::std::stringify!($field)),)*]
			}

			#[allow(unused_mut, unused_variables)]
			fn assemble(values: ::std::vec::Vec<$crate::BoxValue>) -> $crate::DiResult<Self> {
				let mut values = values.into_iter();
				::std::result::Result::Ok(Self {
					$($field: $crate::take_value::<$ty>(&mut values)?,)*
				})
			}
		}
	};
}

/// Bound struct ready to produce instances
pub struct Struct<T> {
	plan: Plan,
	singleton: Option<Arc<T>>,
}

impl<T: Injectable> Struct<T> {
	pub(crate) fn build(container: &Container) -> DiResult<Self> {
		let fields = T::fields();
		let mut inputs: Vec<Input> = fields
			.iter()
			.enumerate()
			.map(|(index, field)| Input::field(index, field.name, field.key))
			.collect();
		(container.sorter())(container.dependencies(), &mut inputs);

		let bindings = bindings_for(
			type_name::<T>(),
			&inputs,
			container.dependencies(),
			container.params(),
			ParamStart::Fixed(container.param_start_index()),
		)?;
		let plan = Plan::new(bindings, fields.len());
		let singleton = if plan.is_static() {
			Some(Arc::new(T::assemble(plan.resolve_static()?)?))
		} else {
			None
		};

		tracing::debug!(
			target_type = type_name::<T>(),
			fields = fields.len(),
			singleton = singleton.is_some(),
			"bound struct"
		);
		Ok(Self { plan, singleton })
	}

	/// Whether one instance is shared by every request
	pub fn is_singleton(&self) -> bool {
		self.singleton.is_some()
	}

	pub fn singleton(&self) -> Option<Arc<T>> {
		self.singleton.clone()
	}

	pub fn bindings(&self) -> &[Binding] {
		self.plan.bindings()
	}

	/// The instance for `request`
	pub fn acquire(&self, request: &Request) -> DiResult<Arc<T>> {
		if let Some(instance) = &self.singleton {
			return Ok(instance.clone());
		}
		self.acquire_with(&mut Resolver::new(request))
	}

	/// The instance for the request `resolver` is serving
	pub fn acquire_with(&self, resolver: &mut Resolver<'_>) -> DiResult<Arc<T>> {
		if let Some(instance) = &self.singleton {
			return Ok(instance.clone());
		}
		let values = self.plan.resolve(resolver)?;
		T::assemble(values).map(Arc::new)
	}
}

impl<T> fmt::Debug for Struct<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Struct")
			.field("type", &type_name::<T>())
			.field("bindings", &self.plan.bindings())
			.field("singleton", &self.singleton.is_some())
			.finish()
	}
}
