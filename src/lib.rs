//! # Hero
//!
//! Handlers from plain functions, with their inputs injected.
//!
//! Hero binds every parameter of a handler function, or every field of an
//! injectable struct, to a provider when the handler is built: a registered
//! value, a provider function, the decoded request body, a path parameter or
//! one of the request's own parts. Serving a request then only runs the
//! providers and calls the function.
//!
//! - [`http`]: request, response, session and the [`Handler`] trait
//! - [`Container`]: registration and the handler factory
//! - [`injectable!`]: structs built from injected fields
//!
//! ## Quick Example
//!
//! ```
//! use hero::prelude::*;
//!
//! #[derive(Clone)]
//! struct Store { name: &'static str }
//!
//! let mut container = Container::new();
//! container.register_value(Store { name: "main" }).unwrap();
//!
//! let handler = container
//!     .handler(|store: Store, id: u32| async move {
//!         format!("item {} from {}", id, store.name)
//!     })
//!     .unwrap();
//!
//! let request = Request::builder()
//!     .uri("/items/3")
//!     .path_param("id", "3")
//!     .build()
//!     .unwrap();
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let response = handler.handle(request).await;
//! assert_eq!(response.body_text(), "item 3 from main");
//! # });
//! ```

pub use hero_di::*;
pub use hero_http as http;
pub use hyper::StatusCode;

pub mod prelude {
	pub use crate::{
		Container, DefaultErrorHandler, Dependency, DependencyScope, DiError, DiResult, DiSettings,
		ErrorHandler, Handler, Injectable, Json, Reply, Request, Response, Session, StatusCode,
		injectable,
	};

	// External
	pub use async_trait::async_trait;
	pub use serde::{Deserialize, Serialize};
}
