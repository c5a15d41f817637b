//! Matching target inputs to dependencies and path parameters
//!
//! Inputs are visited in order. For each input the registered dependencies
//! are scanned from the most recently registered to the oldest, and the
//! first one that matches wins. A dependency that is not explicit fills at
//! most one input of a target; an explicit one fills every input of its
//! exact type.
//!
//! Inputs whose type can be parsed from a path segment take path parameters
//! in declaration order, even when the inputs are visited in another order. When a dependency also matches such an input, the parameter
//! is tried first and the dependency is the fallback.

use crate::dependency::{Dependency, Match};
use crate::input::{BoxValue, Input};
use crate::params::{ParamResolver, ParamResolvers};
use crate::scope::Resolver;
use crate::{DiError, DiResult};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Position of the first path parameter a target consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStart {
	/// Start at this index
	Fixed(usize),
	/// The route has this many parameters; the target consumes the last ones
	Route(usize),
	/// Never bind path parameters
	Disabled,
}

#[derive(Clone)]
enum Source {
	Dependency {
		dependency: Arc<Dependency>,
		via: Match,
	},
	Param {
		index: usize,
		resolver: ParamResolver,
	},
	ParamOr {
		index: usize,
		resolver: ParamResolver,
		dependency: Arc<Dependency>,
		via: Match,
	},
}

/// Where the value of one input comes from
#[derive(Clone)]
pub struct Binding {
	input: Input,
	source: Source,
}

impl Binding {
	pub fn input(&self) -> &Input {
		&self.input
	}

	/// The dependency providing the value, if any
	pub fn dependency(&self) -> Option<&Arc<Dependency>> {
		match &self.source {
			Source::Dependency { dependency, .. } | Source::ParamOr { dependency, .. } => {
				Some(dependency)
			}
			Source::Param { .. } => None,
		}
	}

	/// The path parameter index read for this input, if any
	pub fn param_index(&self) -> Option<usize> {
		match &self.source {
			Source::Param { index, .. } | Source::ParamOr { index, .. } => Some(*index),
			Source::Dependency { .. } => None,
		}
	}

	/// Whether the value is known without a request
	pub fn is_static(&self) -> bool {
		matches!(&self.source, Source::Dependency { dependency, .. } if dependency.is_static())
	}

	pub fn resolve(&self, resolver: &mut Resolver<'_>) -> DiResult<BoxValue> {
		match &self.source {
			Source::Dependency { dependency, via } => dependency.resolve(resolver, &self.input, *via),
			Source::Param { index, resolver: param } => param.extract(resolver.request(), *index),
			Source::ParamOr {
				index,
				resolver: param,
				dependency,
				via,
			} => match param.extract(resolver.request(), *index) {
				Ok(value) => Ok(value),
				Err(error) => {
					tracing::trace!(input = %self.input, %error, "path parameter unavailable, using dependency");
					dependency.resolve(resolver, &self.input, *via)
				}
			},
		}
	}

	fn resolve_static(&self) -> Option<DiResult<BoxValue>> {
		match &self.source {
			Source::Dependency { dependency, via } => dependency.resolve_static(*via),
			_ => None,
		}
	}
}

impl fmt::Display for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.source {
			Source::Dependency { dependency, .. } => {
				write!(f, "{} <- dependency `{}`", self.input, dependency)
			}
			Source::Param { index, .. } => write!(f, "{} <- path parameter #{}", self.input, index),
			Source::ParamOr {
				index, dependency, ..
			} => write!(
				f,
				"{} <- path parameter #{} or dependency `{}`",
				self.input, index, dependency
			),
		}
	}
}

impl fmt::Debug for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

/// Bind as many inputs as possible; unbound inputs are left out
pub fn resolve_bindings(
	inputs: &[Input],
	dependencies: &[Arc<Dependency>],
	params: &ParamResolvers,
	start: ParamStart,
) -> Vec<Binding> {
	let resolvers: Vec<Option<ParamResolver>> = inputs
		.iter()
		.map(|input| match start {
			ParamStart::Disabled => None,
			_ => params.get(&input.key),
		})
		.collect();
	// Path parameters are assigned by declaration index, whatever the visit order.
	let mut declared: Vec<usize> = inputs
		.iter()
		.zip(&resolvers)
		.filter(|(_, resolver)| resolver.is_some())
		.map(|(input, _)| input.index)
		.collect();
	declared.sort_unstable();
	let first_param = match start {
		ParamStart::Fixed(index) => index,
		ParamStart::Route(total) => total.saturating_sub(declared.len()),
		ParamStart::Disabled => 0,
	};
	let param_index = |input: &Input| {
		declared
			.binary_search(&input.index)
			.map(|rank| first_param + rank)
			.unwrap_or(first_param)
	};

	let mut claimed: HashSet<usize> = HashSet::new();
	let mut bindings = Vec::with_capacity(inputs.len());

	for (input, param) in inputs.iter().zip(resolvers) {
		let found = dependencies
			.iter()
			.enumerate()
			.rev()
			.filter(|(position, _)| !claimed.contains(position))
			.find_map(|(position, dependency)| {
				dependency
					.matches(&input.key)
					.map(|via| (position, dependency, via))
			});

		let source = match (found, param) {
			(Some((position, dependency, via)), param) => {
				if !dependency.is_explicit() {
					claimed.insert(position);
				}
				match param {
					Some(resolver) => Source::ParamOr {
						index: param_index(input),
						resolver,
						dependency: dependency.clone(),
						via,
					},
					None => Source::Dependency {
						dependency: dependency.clone(),
						via,
					},
				}
			}
			(None, Some(resolver)) => Source::Param {
				index: param_index(input),
				resolver,
			},
			(None, None) => continue,
		};

		bindings.push(Binding {
			input: input.clone(),
			source,
		});
	}

	bindings
}

/// Bind every input of `target`, or report the ones left without a source
pub fn bindings_for(
	target: &str,
	inputs: &[Input],
	dependencies: &[Arc<Dependency>],
	params: &ParamResolvers,
	start: ParamStart,
) -> DiResult<Vec<Binding>> {
	let bindings = resolve_bindings(inputs, dependencies, params, start);
	if bindings.len() != inputs.len() {
		let bound: HashSet<usize> = bindings.iter().map(|b| b.input.index).collect();
		let missing = inputs
			.iter()
			.filter(|input| !bound.contains(&input.index))
			.map(ToString::to_string)
			.collect();
		return Err(DiError::Unresolved {
			target: target.to_string(),
			expected: inputs.len(),
			got: bindings.len(),
			missing,
		});
	}
	Ok(bindings)
}

/// Bindings of one target, ready to produce its arguments
#[derive(Clone, Debug)]
pub struct Plan {
	bindings: Arc<[Binding]>,
	arity: usize,
}

impl Plan {
	pub fn new(bindings: Vec<Binding>, arity: usize) -> Self {
		Self {
			bindings: bindings.into(),
			arity,
		}
	}

	pub fn bindings(&self) -> &[Binding] {
		&self.bindings
	}

	pub fn arity(&self) -> usize {
		self.arity
	}

	/// Every argument is known without a request
	pub fn is_static(&self) -> bool {
		self.bindings.iter().all(Binding::is_static)
	}

	/// Arguments in declaration order
	pub fn resolve(&self, resolver: &mut Resolver<'_>) -> DiResult<Vec<BoxValue>> {
		let mut slots = self.slots();
		for binding in self.bindings.iter() {
			let value = binding.resolve(resolver)?;
			self.fill(&mut slots, binding, value)?;
		}
		Self::collect(slots)
	}

	pub(crate) fn resolve_static(&self) -> DiResult<Vec<BoxValue>> {
		let mut slots = self.slots();
		for binding in self.bindings.iter() {
			let value = binding.resolve_static().ok_or_else(|| {
				DiError::InvalidDependency(format!("{} is not static", binding))
			})??;
			self.fill(&mut slots, binding, value)?;
		}
		Self::collect(slots)
	}

	fn slots(&self) -> Vec<Option<BoxValue>> {
		(0..self.arity).map(|_| None).collect()
	}

	fn fill(
		&self,
		slots: &mut [Option<BoxValue>],
		binding: &Binding,
		value: BoxValue,
	) -> DiResult<()> {
		let slot = slots.get_mut(binding.input.index).ok_or_else(|| {
			DiError::InvalidDependency(format!(
				"{} is outside of {} inputs",
				binding, self.arity
			))
		})?;
		*slot = Some(value);
		Ok(())
	}

	fn collect(slots: Vec<Option<BoxValue>>) -> DiResult<Vec<BoxValue>> {
		slots
			.into_iter()
			.enumerate()
			.map(|(index, slot)| {
				slot.ok_or_else(|| {
					DiError::InvalidDependency(format!("input #{} has no binding", index))
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::input::TypeKey;
	use hero_http::Request;
	use rstest::rstest;

	#[derive(Clone, Debug, PartialEq)]
	struct Db(&'static str);

	fn inputs(keys: &[TypeKey]) -> Vec<Input> {
		keys.iter()
			.enumerate()
			.map(|(index, key)| Input::new(index, *key))
			.collect()
	}

	fn deps(list: Vec<Dependency>) -> Vec<Arc<Dependency>> {
		list.into_iter().map(Arc::new).collect()
	}

	#[rstest]
	fn later_registration_wins() {
		// Arrange
		let dependencies = deps(vec![Dependency::value(Db("first")), Dependency::value(Db("second"))]);
		let inputs = inputs(&[TypeKey::of::<Db>()]);

		// Act
		let bindings = resolve_bindings(&inputs, &dependencies, &ParamResolvers::new(), ParamStart::Fixed(0));

		// Assert
		assert_eq!(bindings.len(), 1);
		assert_eq!(bindings[0].dependency().unwrap().id(), dependencies[1].id());
	}

	#[rstest]
	fn implicit_dependency_fills_one_input() {
		// Arrange
		let dependencies = deps(vec![Dependency::value(Db("only"))]);
		let inputs = inputs(&[TypeKey::of::<Db>(), TypeKey::of::<Db>()]);

		// Act
		let result = bindings_for("target", &inputs, &dependencies, &ParamResolvers::new(), ParamStart::Fixed(0));

		// Assert
		match result {
			Err(DiError::Unresolved { expected, got, missing, .. }) => {
				assert_eq!((expected, got), (2, 1));
				assert!(missing[0].starts_with("#1"));
			}
			other => panic!("expected Unresolved, got {:?}", other),
		}
	}

	#[rstest]
	fn explicit_dependency_fills_every_input() {
		// Arrange
		let dependencies = deps(vec![Dependency::value(Db("shared")).explicitly()]);
		let inputs = inputs(&[TypeKey::of::<Db>(), TypeKey::of::<Db>()]);

		// Act
		let bindings = bindings_for("target", &inputs, &dependencies, &ParamResolvers::new(), ParamStart::Fixed(0)).unwrap();

		// Assert
		assert_eq!(bindings.len(), 2);
	}

	#[rstest]
	fn param_inputs_consume_params_in_order() {
		// Arrange
		let inputs = inputs(&[TypeKey::of::<u64>(), TypeKey::of::<Db>(), TypeKey::of::<String>()]);
		let dependencies = deps(vec![Dependency::value(Db("db"))]);

		// Act
		let bindings = bindings_for("target", &inputs, &dependencies, &ParamResolvers::builtin(), ParamStart::Fixed(0)).unwrap();

		// Assert
		let indexes: Vec<Option<usize>> = bindings.iter().map(Binding::param_index).collect();
		assert_eq!(indexes, vec![Some(0), None, Some(1)]);
	}

	#[rstest]
	fn params_follow_declaration_order_not_visit_order() {
		// Arrange
		let dependencies = deps(vec![Dependency::value(String::from("guest"))]);
		let mut inputs = inputs(&[TypeKey::of::<String>(), TypeKey::of::<u64>()]);
		inputs.reverse();

		// Act
		let bindings = bindings_for("target", &inputs, &dependencies, &ParamResolvers::builtin(), ParamStart::Fixed(0)).unwrap();

		// Assert
		let indexes: Vec<(usize, Option<usize>)> = bindings
			.iter()
			.map(|binding| (binding.input().index, binding.param_index()))
			.collect();
		assert_eq!(indexes, vec![(1, Some(1)), (0, Some(0))]);
	}

	#[rstest]
	#[case(ParamStart::Fixed(1), vec![Some(1), Some(2)])]
	#[case(ParamStart::Route(3), vec![Some(1), Some(2)])]
	#[case(ParamStart::Route(1), vec![Some(0), Some(1)])]
	fn param_start(#[case] start: ParamStart, #[case] expected: Vec<Option<usize>>) {
		// Arrange
		let inputs = inputs(&[TypeKey::of::<u32>(), TypeKey::of::<u32>()]);

		// Act
		let bindings = resolve_bindings(&inputs, &[], &ParamResolvers::builtin(), start);

		// Assert
		let indexes: Vec<Option<usize>> = bindings.iter().map(Binding::param_index).collect();
		assert_eq!(indexes, expected);
	}

	#[rstest]
	fn disabled_params_leave_inputs_unbound() {
		let inputs = inputs(&[TypeKey::of::<u32>()]);
		let bindings = resolve_bindings(&inputs, &[], &ParamResolvers::builtin(), ParamStart::Disabled);
		assert!(bindings.is_empty());
	}

	#[rstest]
	fn param_falls_back_to_dependency() {
		// Arrange
		let dependencies = deps(vec![Dependency::value(String::from("fallback"))]);
		let inputs = inputs(&[TypeKey::of::<String>()]);
		let plan = Plan::new(
			bindings_for("target", &inputs, &dependencies, &ParamResolvers::builtin(), ParamStart::Fixed(0)).unwrap(),
			1,
		);
		let with_param = Request::builder().path_param("name", "from-path").build().unwrap();
		let without_param = Request::builder().build().unwrap();

		// Act
		let first = plan.resolve(&mut Resolver::new(&with_param)).unwrap();
		let second = plan.resolve(&mut Resolver::new(&without_param)).unwrap();

		// Assert
		let first = first.into_iter().next().unwrap().downcast::<String>().unwrap();
		let second = second.into_iter().next().unwrap().downcast::<String>().unwrap();
		assert_eq!(*first, "from-path");
		assert_eq!(*second, "fallback");
	}

	#[rstest]
	fn plan_orders_values_by_declaration() {
		// Arrange
		let dependencies = deps(vec![Dependency::value(Db("db")), Dependency::value(7u8)]);
		let mut inputs = inputs(&[TypeKey::of::<u8>(), TypeKey::of::<Db>()]);
		inputs.reverse();
		let plan = Plan::new(
			bindings_for("target", &inputs, &dependencies, &ParamResolvers::new(), ParamStart::Fixed(0)).unwrap(),
			2,
		);

		// Act
		let values = plan.resolve_static().unwrap();

		// Assert
		let mut values = values.into_iter();
		assert_eq!(crate::take_value::<u8>(&mut values).unwrap(), 7);
		assert_eq!(crate::take_value::<Db>(&mut values).unwrap(), Db("db"));
		assert!(plan.is_static());
	}
}
