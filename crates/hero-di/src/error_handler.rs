use crate::DiError;
use hero_http::{Request, Response};
use std::sync::Arc;

/// Turns a failed dispatch into a response
pub trait ErrorHandler: Send + Sync {
	fn handle_error(&self, request: &Request, error: DiError) -> Response;
}

impl<F> ErrorHandler for F
where
	F: Fn(&Request, DiError) -> Response + Send + Sync,
{
	fn handle_error(&self, request: &Request, error: DiError) -> Response {
		self(request, error)
	}
}

/// Chooses the error handler for a request
pub type ErrorHandlerFactory = Arc<dyn Fn(&Request) -> Arc<dyn ErrorHandler> + Send + Sync>;

/// Answers with the error's status code and its message as plain text
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
	fn handle_error(&self, request: &Request, error: DiError) -> Response {
		if let DiError::Halt(response) = error {
			return *response;
		}
		let status = error.status_code();
		if status.is_server_error() {
			tracing::warn!(method = %request.method, path = request.path(), %error, "handler failed");
		} else {
			tracing::debug!(method = %request.method, path = request.path(), %error, "request rejected");
		}
		Response::new(status)
			.with_header("content-type", "text/plain; charset=utf-8")
			.with_body(error.to_string())
	}
}

/// Factory returning the same handler for every request
pub fn shared<H: ErrorHandler + 'static>(handler: H) -> ErrorHandlerFactory {
	let handler: Arc<dyn ErrorHandler> = Arc::new(handler);
	Arc::new(move |_: &Request| handler.clone())
}

pub fn default_factory() -> ErrorHandlerFactory {
	shared(DefaultErrorHandler)
}
