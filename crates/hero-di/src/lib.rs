//! # hero-di
//!
//! Dependency injection for request handlers.
//!
//! A [`Container`] holds dependencies: static values, functions of the
//! request, provider functions whose own parameters are injected, request
//! payloads and injectable structs. From it, plain async functions become
//! [`Handler`]s: each parameter is bound once, when the handler is built,
//! to a dependency or a path parameter, and resolved for every request.
//!
//! ## Example
//!
//! ```
//! use hero_di::{Container, Handler, Json, Request};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone)]
//! struct Prefix(String);
//!
//! #[derive(Clone, Deserialize)]
//! struct NewItem { name: String }
//!
//! #[derive(Serialize)]
//! struct Item { id: u64, name: String }
//!
//! let mut container = Container::new();
//! container.register_value(Prefix("item-".into())).unwrap();
//! container.register_payload::<NewItem>().unwrap();
//!
//! let handler = container
//!     .handler(|id: u64, prefix: Prefix, body: NewItem| async move {
//!         Json(Item { id, name: format!("{}{}", prefix.0, body.name) })
//!     })
//!     .unwrap();
//!
//! let request = Request::builder()
//!     .method(hyper::Method::POST)
//!     .uri("/items/7")
//!     .header("content-type", "application/json")
//!     .body(r#"{"name":"lamp"}"#)
//!     .path_param("id", "7")
//!     .build()
//!     .unwrap();
//!
//! # tokio_test::block_on(async {
//! let response = handler.handle(request).await;
//! assert_eq!(response.body_text(), r#"{"id":7,"name":"item-lamp"}"#);
//! # });
//! ```
//!
//! ## Binding rules
//!
//! - Later registrations win over earlier ones of the same type.
//! - A dependency fills at most one input of a target unless it was
//!   registered [`explicitly`](Dependency::explicitly).
//! - Inputs of a path parameter type (strings, numbers, booleans, chars and
//!   any type added with [`Container::register_param_type`]) read the next
//!   path parameter and fall back to a matching dependency.
//! - A target with an input left unbound is rejected with
//!   [`DiError::Unresolved`].

pub mod binding;
pub mod builtin;
pub mod callable;
pub mod container;
pub mod dependency;
pub mod error;
pub mod error_handler;
pub mod handler;
pub mod input;
pub mod params;
pub mod payload;
pub mod reply;
pub mod scope;
pub mod settings;
pub mod sorter;
pub mod structs;

pub use binding::{Binding, ParamStart, Plan, bindings_for, resolve_bindings};
pub use builtin::builtin_dependencies;
pub use callable::Callable;
pub use container::Container;
pub use dependency::{Dependency, DependencyKind, Match};
pub use error::{DiError, DiResult};
pub use error_handler::{DefaultErrorHandler, ErrorHandler, ErrorHandlerFactory};
pub use handler::FnHandler;
pub use input::{BoxValue, Input, TypeKey, take_value};
pub use params::{ParamResolver, ParamResolvers};
pub use payload::DEFAULT_MAX_BODY_SIZE;
pub use reply::{Json, Reply};
pub use scope::{DependencyId, DependencyScope, RequestScope, Resolver};
pub use settings::DiSettings;
pub use sorter::Sorter;
pub use structs::{Field, Injectable, Struct};

pub use hero_http::{Handler, PathParams, Request, Response, Session};
