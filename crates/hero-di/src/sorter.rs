//! Ordering of struct fields before binding
//!
//! Fields are bound one after another and a non-explicit dependency fills a
//! single field, so the order decides which field gets a contested
//! dependency.

use crate::dependency::Dependency;
use crate::input::{Input, TypeKey};
use std::sync::Arc;

/// Reorders inputs in place before they are bound
pub type Sorter = fn(&[Arc<Dependency>], &mut [Input]);

/// Fields with fewer candidate dependencies are bound first.
///
/// Ties keep declaration order.
pub fn by_specificity(dependencies: &[Arc<Dependency>], inputs: &mut [Input]) {
	inputs.sort_by_cached_key(|input| candidates(dependencies, &input.key));
}

/// Keep declaration order
pub fn declaration_order(_dependencies: &[Arc<Dependency>], _inputs: &mut [Input]) {}

/// Number of dependencies able to fill an input of type `key`
pub fn candidates(dependencies: &[Arc<Dependency>], key: &TypeKey) -> usize {
	dependencies
		.iter()
		.filter(|dependency| dependency.matches(key).is_some())
		.count()
}
