//! Dependencies: providers of values for handler inputs

use crate::binding::{ParamStart, Plan, bindings_for};
use crate::callable::Callable;
use crate::input::{BoxValue, Input, TypeKey, clone_value};
use crate::params::ParamResolvers;
use crate::payload::{self, DEFAULT_MAX_BODY_SIZE};
use crate::scope::{Cloner, DependencyId, DependencyScope, Resolver};
use crate::structs::{Injectable, Struct};
use crate::{DiError, DiResult};
use hero_http::Request;
use serde::de::DeserializeOwned;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

type StaticFn = Arc<dyn Fn() -> BoxValue + Send + Sync>;
type ResolveFn = Arc<dyn Fn(&mut Resolver<'_>, &Input) -> DiResult<BoxValue> + Send + Sync>;
type InvokeFn = Arc<dyn Fn(Vec<BoxValue>) -> DiResult<BoxValue> + Send + Sync>;
type FreezeFn = fn(BoxValue) -> Option<StaticFn>;
type ConvertFn = Arc<dyn Fn(BoxValue) -> DiResult<BoxValue> + Send + Sync>;
type MatchFn = Arc<dyn Fn(&TypeKey) -> bool + Send + Sync>;

#[derive(Clone)]
enum Handle {
	/// Value known up front
	Static(StaticFn),
	/// Computed from the request being served
	Resolve(ResolveFn),
	/// Provider function whose inputs are not bound yet
	Unbound(UnboundFunc),
}

#[derive(Clone)]
struct UnboundFunc {
	inputs: Vec<TypeKey>,
	invoke: InvokeFn,
	freeze: FreezeFn,
}

#[derive(Clone)]
struct Alias {
	from: TypeKey,
	key: TypeKey,
	convert: ConvertFn,
}

/// What a dependency was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
	Value,
	Func,
	Request,
	Payload,
	Struct,
	Dynamic,
}

/// How a dependency matched an input type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
	Exact,
	/// Through the alias at this position
	Alias(usize),
	Dynamic,
}

/// A provider of values of one type.
///
/// A dependency is either a static value, a function of the request, or a
/// provider function whose own parameters are injected. Provider functions
/// are bound against the dependencies registered before them; when every
/// input of a provider is static the provider runs once and its result is
/// reused.
///
/// # Examples
///
/// ```
/// use hero_di::{Container, Dependency, DependencyScope};
///
/// #[derive(Clone)]
/// struct Config { name: String }
///
/// let mut container = Container::empty();
/// container.register(Dependency::value(Config { name: "app".into() })).unwrap();
/// let greeting = container
///     .register(Dependency::func(|config: Config| format!("hello {}", config.name)))
///     .unwrap();
///
/// assert_eq!(greeting.scope(), DependencyScope::Static);
/// ```
pub struct Dependency {
	id: DependencyId,
	label: String,
	kind: DependencyKind,
	dest: Option<TypeKey>,
	handle: Handle,
	scope: DependencyScope,
	explicit: bool,
	aliases: Vec<Alias>,
	matcher: Option<MatchFn>,
	cloner: Option<Cloner>,
}

/// A clone is a separate provider with its own id, so request-scoped
/// values of the original and the clone are memoized apart.
impl Clone for Dependency {
	fn clone(&self) -> Self {
		Self {
			id: DependencyId::next(),
			label: self.label.clone(),
			kind: self.kind,
			dest: self.dest,
			handle: self.handle.clone(),
			scope: self.scope,
			explicit: self.explicit,
			aliases: self.aliases.clone(),
			matcher: self.matcher.clone(),
			cloner: self.cloner,
		}
	}
}

impl Dependency {
	fn typed<T: Any + Send + Clone>(
		kind: DependencyKind,
		handle: Handle,
		scope: DependencyScope,
	) -> Self {
		Self {
			id: DependencyId::next(),
			label: type_name::<T>().to_string(),
			kind,
			dest: Some(TypeKey::of::<T>()),
			handle,
			scope,
			explicit: false,
			aliases: Vec::new(),
			matcher: None,
			cloner: Some(clone_value::<T>),
		}
	}

	/// A static value, cloned into every input of type `T`
	pub fn value<T>(value: T) -> Self
	where
		T: Clone + Send + Sync + 'static,
	{
		let produce: StaticFn = Arc::new(move || Box::new(value.clone()) as BoxValue);
		Self::typed::<T>(DependencyKind::Value, Handle::Static(produce), DependencyScope::Static)
	}

	/// A provider function; its parameters are injected like a handler's
	pub fn func<F, Args, T>(func: F) -> Self
	where
		F: Callable<Args, Output = T>,
		Args: 'static,
		T: Clone + Send + Sync + 'static,
	{
		let invoke: InvokeFn = Arc::new(move |args: Vec<BoxValue>| {
			func.call(args).map(|value| Box::new(value) as BoxValue)
		});
		Self::unbound::<F, Args, T>(invoke)
	}

	/// A fallible provider function; its error fails the request
	pub fn try_func<F, Args, T, E>(func: F) -> Self
	where
		F: Callable<Args, Output = Result<T, E>>,
		Args: 'static,
		T: Clone + Send + Sync + 'static,
		E: Into<DiError>,
	{
		let invoke: InvokeFn = Arc::new(move |args: Vec<BoxValue>| {
			func.call(args)?
				.map(|value| Box::new(value) as BoxValue)
				.map_err(Into::into)
		});
		Self::unbound::<F, Args, T>(invoke)
	}

	fn unbound<F, Args, T>(invoke: InvokeFn) -> Self
	where
		F: Callable<Args>,
		T: Clone + Send + Sync + 'static,
	{
		let func = UnboundFunc {
			inputs: F::inputs(),
			invoke,
			freeze: freeze::<T>,
		};
		Self::typed::<T>(DependencyKind::Func, Handle::Unbound(func), DependencyScope::Transient)
			.named(type_name::<F>())
	}

	/// A value computed from the request for every input that needs it
	pub fn from_request<T, F>(func: F) -> Self
	where
		T: Clone + Send + Sync + 'static,
		F: Fn(&Request) -> DiResult<T> + Send + Sync + 'static,
	{
		let resolve: ResolveFn = Arc::new(move |resolver: &mut Resolver<'_>, _: &Input| {
			func(resolver.request()).map(|value| Box::new(value) as BoxValue)
		});
		Self::typed::<T>(DependencyKind::Request, Handle::Resolve(resolve), DependencyScope::Transient)
	}

	/// A dependency without a fixed type.
	///
	/// It is offered every input type `matcher` accepts and must produce a
	/// value of exactly that type. Dynamic dependencies are tried after every
	/// typed one.
	pub fn dynamic<M, H>(matcher: M, handle: H) -> Self
	where
		M: Fn(&TypeKey) -> bool + Send + Sync + 'static,
		H: Fn(&mut Resolver<'_>, &Input) -> DiResult<BoxValue> + Send + Sync + 'static,
	{
		Self {
			id: DependencyId::next(),
			label: "dynamic".to_string(),
			kind: DependencyKind::Dynamic,
			dest: None,
			handle: Handle::Resolve(Arc::new(handle)),
			scope: DependencyScope::Transient,
			explicit: false,
			aliases: Vec::new(),
			matcher: Some(Arc::new(matcher)),
			cloner: None,
		}
	}

	/// The decoded request body, once per request
	pub fn payload<T>() -> Self
	where
		T: DeserializeOwned + Clone + Send + Sync + 'static,
	{
		Self::payload_with_limit::<T>(DEFAULT_MAX_BODY_SIZE)
	}

	pub fn payload_with_limit<T>(limit: usize) -> Self
	where
		T: DeserializeOwned + Clone + Send + Sync + 'static,
	{
		let resolve: ResolveFn = Arc::new(move |resolver: &mut Resolver<'_>, _: &Input| {
			payload::decode::<T>(resolver.request(), limit).map(|value| Box::new(value) as BoxValue)
		});
		Self::typed::<T>(DependencyKind::Payload, Handle::Resolve(resolve), DependencyScope::Request)
			.named(format!("payload {}", type_name::<T>()))
	}

	/// Instances of an injectable struct, shared as `Arc<T>`
	pub fn from_struct<T: Injectable>(structure: Struct<T>) -> Self {
		if let Some(instance) = structure.singleton() {
			let produce: StaticFn = Arc::new(move || Box::new(instance.clone()) as BoxValue);
			return Self::typed::<Arc<T>>(DependencyKind::Struct, Handle::Static(produce), DependencyScope::Static);
		}
		let resolve: ResolveFn = Arc::new(move |resolver: &mut Resolver<'_>, _: &Input| {
			structure
				.acquire_with(resolver)
				.map(|instance| Box::new(instance) as BoxValue)
		});
		Self::typed::<Arc<T>>(DependencyKind::Struct, Handle::Resolve(resolve), DependencyScope::Transient)
	}

	/// Only bind inputs of exactly this type, and bind all of them.
	///
	/// A dynamic dependency marked explicit fills every input its matcher
	/// accepts.
	pub fn explicitly(mut self) -> Self {
		self.explicit = true;
		self
	}

	/// Also provide `U` for inputs of that type, converting from `T`.
	///
	/// `T` must be the provided type; this is checked when the dependency is
	/// registered.
	///
	/// # Examples
	///
	/// ```
	/// use hero_di::{Dependency, Match, TypeKey};
	/// use std::sync::Arc;
	///
	/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
	///
	/// #[derive(Clone)]
	/// struct English;
	/// impl Greeter for English { fn greet(&self) -> String { "hello".into() } }
	///
	/// let dependency = Dependency::value(English)
	///     .also_as(|english: English| Arc::new(english) as Arc<dyn Greeter>);
	///
	/// assert_eq!(dependency.matches(&TypeKey::of::<English>()), Some(Match::Exact));
	/// assert_eq!(dependency.matches(&TypeKey::of::<Arc<dyn Greeter>>()), Some(Match::Alias(0)));
	/// ```
	pub fn also_as<T, U, F>(mut self, convert: F) -> Self
	where
		T: Any + Send,
		U: Any + Send,
		F: Fn(T) -> U + Send + Sync + 'static,
	{
		let convert: ConvertFn = Arc::new(move |value: BoxValue| {
			let value = value.downcast::<T>().map_err(|_| DiError::TypeMismatch {
				expected: type_name::<T>(),
			})?;
			Ok(Box::new(convert(*value)) as BoxValue)
		});
		self.aliases.push(Alias {
			from: TypeKey::of::<T>(),
			key: TypeKey::of::<U>(),
			convert,
		});
		self
	}

	/// Compute once per request and share the value between inputs
	pub fn request_scoped(mut self) -> Self {
		if self.scope == DependencyScope::Transient && self.cloner.is_some() {
			self.scope = DependencyScope::Request;
		}
		self
	}

	/// Name used in logs and error reports
	pub fn named(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn id(&self) -> DependencyId {
		self.id
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn kind(&self) -> DependencyKind {
		self.kind
	}

	/// The provided type, `None` for dynamic dependencies
	pub fn dest(&self) -> Option<TypeKey> {
		self.dest
	}

	pub fn scope(&self) -> DependencyScope {
		self.scope
	}

	pub fn is_explicit(&self) -> bool {
		self.explicit
	}

	pub fn is_static(&self) -> bool {
		matches!(self.handle, Handle::Static(_))
	}

	pub fn is_bound(&self) -> bool {
		!matches!(self.handle, Handle::Unbound(_))
	}

	/// Extra types provided through [`Dependency::also_as`]
	pub fn also_provides(&self) -> Vec<TypeKey> {
		self.aliases.iter().map(|alias| alias.key).collect()
	}

	/// Whether this dependency can fill an input of type `key`
	pub fn matches(&self, key: &TypeKey) -> Option<Match> {
		match self.dest {
			Some(dest) if dest == *key => Some(Match::Exact),
			Some(_) if self.explicit => None,
			Some(_) => self
				.aliases
				.iter()
				.position(|alias| alias.key == *key)
				.map(Match::Alias),
			None => self
				.matcher
				.as_ref()
				.filter(|matcher| matcher(key))
				.map(|_| Match::Dynamic),
		}
	}

	fn validate(&self) -> DiResult<()> {
		if let Some(dest) = self.dest {
			if let Some(alias) = self.aliases.iter().find(|alias| alias.from != dest) {
				return Err(DiError::InvalidDependency(format!(
					"{}: alias to `{}` converts from `{}` but the dependency provides `{}`",
					self.label, alias.key, alias.from, dest
				)));
			}
		} else if self.matcher.is_none() {
			return Err(DiError::InvalidDependency(format!(
				"{}: dependency has neither a type nor a matcher",
				self.label
			)));
		}
		Ok(())
	}

	/// Bind the inputs of a provider function.
	///
	/// Other dependencies are returned unchanged after validation.
	pub fn bind(
		self,
		available: &[Arc<Dependency>],
		params: &ParamResolvers,
		start: ParamStart,
	) -> DiResult<Dependency> {
		self.validate()?;
		let func = match &self.handle {
			Handle::Unbound(func) => func.clone(),
			_ => return Ok(self),
		};

		let inputs: Vec<Input> = func
			.inputs
			.iter()
			.enumerate()
			.map(|(index, key)| Input::new(index, *key))
			.collect();
		let bindings = bindings_for(&self.label, &inputs, available, params, start)?;
		let plan = Plan::new(bindings, inputs.len());

		if !inputs.is_empty() && plan.is_static() {
			let value = (func.invoke)(plan.resolve_static()?)?;
			let produce = (func.freeze)(value).ok_or(DiError::TypeMismatch {
				expected: self.dest.map(|dest| dest.name()).unwrap_or("unknown"),
			})?;
			tracing::trace!(dependency = %self.label, "provider inputs are static, value computed once");
			return Ok(Dependency {
				handle: Handle::Static(produce),
				scope: DependencyScope::Static,
				..self
			});
		}

		let invoke = func.invoke;
		let resolve: ResolveFn = Arc::new(move |resolver: &mut Resolver<'_>, _: &Input| {
			let args = plan.resolve(resolver)?;
			invoke(args)
		});
		Ok(Dependency {
			handle: Handle::Resolve(resolve),
			..self
		})
	}

	/// The value for `input`, when it can be produced without a request
	pub(crate) fn resolve_static(&self, via: Match) -> Option<DiResult<BoxValue>> {
		match &self.handle {
			Handle::Static(produce) => Some(self.convert(produce(), via)),
			_ => None,
		}
	}

	pub(crate) fn resolve(
		&self,
		resolver: &mut Resolver<'_>,
		input: &Input,
		via: Match,
	) -> DiResult<BoxValue> {
		let value = match &self.handle {
			Handle::Static(produce) => produce(),
			Handle::Resolve(resolve) => self.resolve_scoped(resolve, resolver, input)?,
			Handle::Unbound(_) => return Err(DiError::Unbound(self.label.clone())),
		};
		self.convert(value, via)
	}

	fn resolve_scoped(
		&self,
		resolve: &ResolveFn,
		resolver: &mut Resolver<'_>,
		input: &Input,
	) -> DiResult<BoxValue> {
		let cloner = match (self.scope, self.cloner) {
			(DependencyScope::Request, Some(cloner)) => cloner,
			_ => return resolve(resolver, input),
		};
		if let Some(cached) = resolver.scope().get(self.id, cloner) {
			return Ok(cached);
		}
		let value = resolve(resolver, input)?;
		if let Some(copy) = cloner(value.as_ref()) {
			resolver.scope_mut().set(self.id, copy);
		}
		Ok(value)
	}

	fn convert(&self, value: BoxValue, via: Match) -> DiResult<BoxValue> {
		match via {
			Match::Alias(position) => match self.aliases.get(position) {
				Some(alias) => (alias.convert)(value),
				None => Err(DiError::InvalidDependency(format!(
					"{}: no alias at position {}",
					self.label, position
				))),
			},
			Match::Exact | Match::Dynamic => Ok(value),
		}
	}
}

fn freeze<T: Clone + Send + Sync + 'static>(value: BoxValue) -> Option<StaticFn> {
	let value = *value.downcast::<T>().ok()?;
	Some(Arc::new(move || Box::new(value.clone()) as BoxValue))
}

impl fmt::Debug for Dependency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dependency")
			.field("label", &self.label)
			.field("kind", &self.kind)
			.field("dest", &self.dest)
			.field("scope", &self.scope)
			.field("explicit", &self.explicit)
			.field("also_provides", &self.also_provides())
			.field("bound", &self.is_bound())
			.finish()
	}
}

impl fmt::Display for Dependency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label)
	}
}
