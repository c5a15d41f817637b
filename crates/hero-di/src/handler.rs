//! Handlers built from plain functions

use crate::binding::{Binding, Plan};
use crate::callable::Callable;
use crate::error_handler::ErrorHandlerFactory;
use crate::reply::Reply;
use crate::scope::Resolver;
use crate::DiError;
use async_trait::async_trait;
use hero_http::{Handler, Request, Response};
use std::future::Future;
use std::marker::PhantomData;

/// A function whose inputs were bound by a [`Container`](crate::Container).
///
/// For every request the bound values are produced, the function is called
/// and its output is turned into a response. Errors from providers, from the
/// function itself or from the output conversion go to the error handler,
/// except [`DiError::Halt`] whose response is sent unchanged.
pub struct FnHandler<F, Args> {
	func: F,
	plan: Plan,
	name: &'static str,
	error_handler: ErrorHandlerFactory,
	_args: PhantomData<fn() -> Args>,
}

impl<F, Args> FnHandler<F, Args> {
	pub(crate) fn new(
		func: F,
		plan: Plan,
		name: &'static str,
		error_handler: ErrorHandlerFactory,
	) -> Self {
		Self {
			func,
			plan,
			name,
			error_handler,
			_args: PhantomData,
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn bindings(&self) -> &[Binding] {
		self.plan.bindings()
	}
}

#[async_trait]
impl<F, Args, Fut> Handler for FnHandler<F, Args>
where
	F: Callable<Args, Output = Fut>,
	Args: 'static,
	Fut: Future + Send + 'static,
	Fut::Output: Reply,
{
	async fn handle(&self, request: Request) -> Response {
		let call = {
			let mut resolver = Resolver::new(&request);
			self.plan
				.resolve(&mut resolver)
				.and_then(|args| self.func.call(args))
		};

		let result = match call {
			Ok(future) => future.await.into_reply(),
			Err(error) => Err(error),
		};

		match result {
			Ok(response) => response,
			Err(DiError::Halt(response)) => {
				tracing::trace!(handler = self.name, status = %response.status, "execution stopped");
				*response
			}
			Err(error) => {
				tracing::debug!(handler = self.name, %error, "dispatch failed");
				(self.error_handler)(&request).handle_error(&request, error)
			}
		}
	}
}
