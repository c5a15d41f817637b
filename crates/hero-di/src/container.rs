//! The dependency container and handler factory

use crate::binding::{ParamStart, Plan, bindings_for};
use crate::builtin::builtin_dependencies;
use crate::callable::Callable;
use crate::dependency::Dependency;
use crate::error_handler::{self, ErrorHandler, ErrorHandlerFactory};
use crate::handler::FnHandler;
use crate::input::{Input, TypeKey, take_value};
use crate::params::ParamResolvers;
use crate::reply::Reply;
use crate::scope::Resolver;
use crate::settings::DiSettings;
use crate::sorter::{self, Sorter};
use crate::structs::{Injectable, Struct};
use crate::DiResult;
use hero_http::Request;
use serde::de::DeserializeOwned;
use std::any::{Any, type_name};
use std::fmt::{self, Display};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// Registered dependencies plus the rules used to bind them.
///
/// Handlers and structs are bound against the dependencies registered when
/// they are built; later registrations do not affect them. Cloning gives an
/// independent container that starts with the same dependencies.
///
/// # Examples
///
/// ```
/// use hero_di::{Container, Handler, Request};
///
/// #[derive(Clone)]
/// struct Greeting(&'static str);
///
/// let mut container = Container::new();
/// container.register_value(Greeting("hello")).unwrap();
///
/// let handler = container
///     .handler(|greeting: Greeting, name: String| async move {
///         format!("{} {}", greeting.0, name)
///     })
///     .unwrap();
///
/// let request = Request::builder()
///     .uri("/greet/ada")
///     .path_param("name", "ada")
///     .build()
///     .unwrap();
///
/// # tokio_test::block_on(async {
/// let response = handler.handle(request).await;
/// assert_eq!(response.body_text(), "hello ada");
/// # });
/// ```
#[derive(Clone)]
pub struct Container {
	dependencies: Vec<Arc<Dependency>>,
	sorter: Sorter,
	param_start_index: usize,
	params: ParamResolvers,
	error_handler: ErrorHandlerFactory,
	settings: DiSettings,
}

impl Container {
	/// A container with the builtin dependencies
	pub fn new() -> Self {
		Self::with_settings(DiSettings::default())
	}

	/// A container without any dependency
	pub fn empty() -> Self {
		Self::with_settings(DiSettings {
			builtins: false,
			..DiSettings::default()
		})
	}

	pub fn with_settings(settings: DiSettings) -> Self {
		let dependencies = if settings.builtins {
			builtin_dependencies().into_iter().map(Arc::new).collect()
		} else {
			Vec::new()
		};
		Self {
			dependencies,
			sorter: sorter::by_specificity,
			param_start_index: settings.param_start_index,
			params: ParamResolvers::builtin(),
			error_handler: error_handler::default_factory(),
			settings,
		}
	}

	/// A container with the builtin dependencies followed by `dependencies`
	pub fn with_dependencies<I>(dependencies: I) -> DiResult<Self>
	where
		I: IntoIterator<Item = Dependency>,
	{
		let mut container = Self::new();
		for dependency in dependencies {
			container.register(dependency)?;
		}
		Ok(container)
	}

	/// Bind and add a dependency.
	///
	/// Provider functions are bound against the dependencies registered so
	/// far. Typed dependencies take precedence over earlier ones of the same
	/// type; dynamic dependencies are tried after every typed one.
	pub fn register(&mut self, dependency: Dependency) -> DiResult<Arc<Dependency>> {
		let bound = Arc::new(dependency.bind(
			&self.dependencies,
			&self.params,
			ParamStart::Fixed(self.param_start_index),
		)?);
		tracing::debug!(
			dependency = %bound,
			kind = ?bound.kind(),
			scope = ?bound.scope(),
			explicit = bound.is_explicit(),
			"registered dependency"
		);
		if bound.dest().is_none() {
			self.dependencies.insert(0, bound.clone());
		} else {
			self.dependencies.push(bound.clone());
		}
		Ok(bound)
	}

	pub fn register_value<T>(&mut self, value: T) -> DiResult<Arc<Dependency>>
	where
		T: Clone + Send + Sync + 'static,
	{
		self.register(Dependency::value(value))
	}

	pub fn register_func<F, Args, T>(&mut self, func: F) -> DiResult<Arc<Dependency>>
	where
		F: Callable<Args, Output = T>,
		Args: 'static,
		T: Clone + Send + Sync + 'static,
	{
		self.register(Dependency::func(func))
	}

	/// Provide `T` decoded from the request, limited to the configured body size
	pub fn register_payload<T>(&mut self) -> DiResult<Arc<Dependency>>
	where
		T: DeserializeOwned + Clone + Send + Sync + 'static,
	{
		self.register(Dependency::payload_with_limit::<T>(self.settings.max_body_size))
	}

	/// Provide `Arc<T>` for an injectable struct
	pub fn register_struct<T: Injectable>(&mut self) -> DiResult<Arc<Dependency>> {
		let structure = self.struct_of::<T>()?;
		self.register(Dependency::from_struct(structure))
	}

	/// Allow inputs of type `T` to be read from path parameters
	pub fn register_param_type<T>(&mut self) -> &mut Self
	where
		T: FromStr + Send + 'static,
		T::Err: Display,
	{
		self.params.register::<T>();
		self
	}

	pub fn dependencies(&self) -> &[Arc<Dependency>] {
		&self.dependencies
	}

	pub fn len(&self) -> usize {
		self.dependencies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.dependencies.is_empty()
	}

	pub fn settings(&self) -> &DiSettings {
		&self.settings
	}

	pub fn params(&self) -> &ParamResolvers {
		&self.params
	}

	pub fn sorter(&self) -> Sorter {
		self.sorter
	}

	pub fn with_sorter(mut self, sorter: Sorter) -> Self {
		self.sorter = sorter;
		self
	}

	pub fn param_start_index(&self) -> usize {
		self.param_start_index
	}

	pub fn with_param_start_index(mut self, index: usize) -> Self {
		self.param_start_index = index;
		self
	}

	/// Choose the error handler per request
	pub fn with_error_handler<F>(mut self, factory: F) -> Self
	where
		F: Fn(&Request) -> Arc<dyn ErrorHandler> + Send + Sync + 'static,
	{
		self.error_handler = Arc::new(factory);
		self
	}

	/// Use one error handler for every request
	pub fn with_shared_error_handler<H: ErrorHandler + 'static>(mut self, handler: H) -> Self {
		self.error_handler = error_handler::shared(handler);
		self
	}

	pub fn error_handler_for(&self, request: &Request) -> Arc<dyn ErrorHandler> {
		(self.error_handler)(request)
	}

	/// Build a handler from a function of injectable parameters.
	///
	/// Fails when an input has neither a dependency nor a path parameter.
	pub fn handler<F, Args, Fut>(&self, func: F) -> DiResult<FnHandler<F, Args>>
	where
		F: Callable<Args, Output = Fut>,
		Args: 'static,
		Fut: Future + Send + 'static,
		Fut::Output: Reply,
	{
		self.build_handler(func, ParamStart::Fixed(self.param_start_index))
	}

	/// Build a handler for a route with `params_count` path parameters.
	///
	/// The handler's parameter inputs consume the last path parameters of
	/// the route, so a parent route's parameters are skipped.
	pub fn handler_for_route<F, Args, Fut>(
		&self,
		func: F,
		params_count: usize,
	) -> DiResult<FnHandler<F, Args>>
	where
		F: Callable<Args, Output = Fut>,
		Args: 'static,
		Fut: Future + Send + 'static,
		Fut::Output: Reply,
	{
		self.build_handler(func, ParamStart::Route(params_count))
	}

	fn build_handler<F, Args, Fut>(&self, func: F, start: ParamStart) -> DiResult<FnHandler<F, Args>>
	where
		F: Callable<Args, Output = Fut>,
		Args: 'static,
		Fut: Future + Send + 'static,
		Fut::Output: Reply,
	{
		let name = type_name::<F>();
		let inputs: Vec<Input> = <F as Callable<Args>>::inputs()
			.into_iter()
			.enumerate()
			.map(|(index, key)| Input::new(index, key))
			.collect();
		let bindings = bindings_for(name, &inputs, &self.dependencies, &self.params, start)?;
		for binding in &bindings {
			tracing::trace!(handler = name, %binding, "bound input");
		}
		tracing::debug!(handler = name, inputs = inputs.len(), "built handler");
		Ok(FnHandler::new(
			func,
			Plan::new(bindings, inputs.len()),
			name,
			self.error_handler.clone(),
		))
	}

	/// Bind an injectable struct
	pub fn struct_of<T: Injectable>(&self) -> DiResult<Struct<T>> {
		Struct::build(self)
	}

	/// Resolve a single value of type `T` for `request`
	pub fn inject<T: Any + Send>(&self, request: &Request) -> DiResult<T> {
		let inputs = [Input::new(0, TypeKey::of::<T>())];
		let bindings = bindings_for(
			type_name::<T>(),
			&inputs,
			&self.dependencies,
			&self.params,
			ParamStart::Fixed(self.param_start_index),
		)?;
		let plan = Plan::new(bindings, 1);
		let values = plan.resolve(&mut Resolver::new(request))?;
		take_value::<T>(&mut values.into_iter())
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Container")
			.field("dependencies", &self.dependencies)
			.field("param_start_index", &self.param_start_index)
			.field("params", &self.params.len())
			.field("settings", &self.settings)
			.finish()
	}
}
