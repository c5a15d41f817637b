use crate::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// Request handler.
///
/// Handlers own error reporting: whatever goes wrong is turned into a
/// [`Response`] before it leaves `handle`.
///
/// # Examples
///
/// ```
/// use hero_http::{Handler, Request, Response};
/// use async_trait::async_trait;
///
/// struct Hello;
///
/// #[async_trait]
/// impl Handler for Hello {
///     async fn handle(&self, _request: Request) -> Response {
///         Response::ok().with_body("hello")
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let response = Hello.handle(Request::builder().build().unwrap()).await;
/// assert_eq!(response.body_text(), "hello");
/// # });
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Response;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
	async fn handle(&self, request: Request) -> Response {
		(**self).handle(request).await
	}
}
