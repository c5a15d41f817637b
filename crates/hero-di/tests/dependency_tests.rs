//! Provider chains, aliases, explicit and dynamic dependencies, request scope

use hero_di::{
	BoxValue, Container, Dependency, DependencyKind, DependencyScope, DiError, Handler, Input,
	Request, Resolver, TypeKey,
};
use hyper::StatusCode;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

trait Repository: Send + Sync {
	fn name(&self) -> String;
}

#[derive(Clone)]
struct Postgres {
	url: String,
}

impl Repository for Postgres {
	fn name(&self) -> String {
		format!("postgres at {}", self.url)
	}
}

#[derive(Clone)]
struct DatabaseUrl(String);

#[fixture]
fn container() -> Container {
	let mut container = Container::new();
	container
		.register_value(DatabaseUrl("localhost:5432".into()))
		.unwrap();
	container
}

fn request() -> Request {
	Request::builder().build().unwrap()
}

#[rstest]
fn provider_chain_is_evaluated_once_when_static(mut container: Container) {
	// Arrange
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();

	// Act
	let postgres = container
		.register_func(move |url: DatabaseUrl| {
			counter.fetch_add(1, Ordering::SeqCst);
			Postgres { url: url.0 }
		})
		.unwrap();
	let first: Postgres = container.inject(&request()).unwrap();
	let second: Postgres = container.inject(&request()).unwrap();

	// Assert
	assert!(postgres.is_static());
	assert_eq!(first.url, "localhost:5432");
	assert_eq!(second.url, "localhost:5432");
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn provider_depending_on_request_runs_per_request(mut container: Container) {
	// Arrange
	#[derive(Clone)]
	struct RequestPath(String);

	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	container
		.register_func(move |request: Request| {
			counter.fetch_add(1, Ordering::SeqCst);
			RequestPath(request.path().to_string())
		})
		.unwrap();

	// Act
	let path: RequestPath = container
		.inject(&Request::builder().uri("/a/b").build().unwrap())
		.unwrap();
	container.inject::<RequestPath>(&request()).unwrap();

	// Assert
	assert_eq!(path.0, "/a/b");
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
fn fallible_provider_error_reaches_the_target(mut container: Container) {
	// Arrange
	#[derive(Clone, Debug)]
	struct Token(String);

	container
		.register(Dependency::try_func(|request: Request| {
			request
				.headers
				.get("authorization")
				.and_then(|value| value.to_str().ok())
				.map(|value| Token(value.to_string()))
				.ok_or_else(|| DiError::status(StatusCode::UNAUTHORIZED, "missing token"))
		}))
		.unwrap();

	// Act
	let error = container.inject::<Token>(&request()).unwrap_err();

	// Assert
	assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn alias_provides_trait_objects(mut container: Container) {
	// Arrange
	container
		.register(
			Dependency::func(|url: DatabaseUrl| Postgres { url: url.0 })
				.also_as(|postgres: Postgres| Arc::new(postgres) as Arc<dyn Repository>),
		)
		.unwrap();
	let handler = container
		.handler(|repository: Arc<dyn Repository>| async move { repository.name() })
		.unwrap();

	// Act
	let response = handler.handle(request()).await;

	// Assert
	assert_eq!(response.body_text(), "postgres at localhost:5432");
}

#[rstest]
fn alias_from_another_type_is_rejected(mut container: Container) {
	// Act
	let result = container.register(
		Dependency::value(DatabaseUrl("x".into())).also_as(|url: String| url.len()),
	);

	// Assert
	assert!(matches!(result, Err(DiError::InvalidDependency(_))));
}

#[rstest]
fn explicit_dependency_fills_every_input(mut container: Container) {
	// Arrange
	#[derive(Clone)]
	struct Pool(u8);

	container
		.register(Dependency::value(Pool(4)).explicitly())
		.unwrap();

	// Act
	let result = container.handler(|a: Pool, b: Pool| async move { (a.0 + b.0).to_string() });

	// Assert
	assert!(result.is_ok());
}

#[rstest]
fn implicit_dependency_fills_one_input(mut container: Container) {
	// Arrange
	#[derive(Clone)]
	struct Pool(u8);

	container.register_value(Pool(4)).unwrap();

	// Act
	let result = container.handler(|a: Pool, b: Pool| async move { (a.0 + b.0).to_string() });

	// Assert
	assert!(matches!(result, Err(DiError::Unresolved { got: 1, .. })));
}

#[rstest]
#[tokio::test]
async fn dynamic_dependency_serves_matching_types() {
	// Arrange
	#[derive(Clone)]
	struct UserRepository;
	#[derive(Clone)]
	struct OrderRepository;

	let mut container = Container::new();
	container
		.register(Dependency::dynamic(
			|key: &TypeKey| key.name().ends_with("Repository"),
			|_: &mut Resolver<'_>, input: &Input| {
				if input.key == TypeKey::of::<UserRepository>() {
					Ok(Box::new(UserRepository) as BoxValue)
				} else if input.key == TypeKey::of::<OrderRepository>() {
					Ok(Box::new(OrderRepository) as BoxValue)
				} else {
					Err(DiError::InvalidDependency(format!("no repository {}", input.key)))
				}
			},
		).explicitly())
		.unwrap();
	let handler = container
		.handler(|_: UserRepository, _: OrderRepository| async { "both" })
		.unwrap();

	// Act
	let response = handler.handle(request()).await;

	// Assert
	assert_eq!(response.body_text(), "both");
}

#[rstest]
fn typed_dependency_wins_over_dynamic() {
	// Arrange
	#[derive(Clone, Debug, PartialEq)]
	struct Clock(u8);

	let mut container = Container::empty();
	container.register_value(Clock(1)).unwrap();
	container
		.register(Dependency::dynamic(
			|_: &TypeKey| true,
			|_: &mut Resolver<'_>, _: &Input| Ok(Box::new(Clock(2)) as BoxValue),
		))
		.unwrap();

	// Act
	let clock: Clock = container.inject(&request()).unwrap();

	// Assert
	assert_eq!(clock, Clock(1));
}

#[rstest]
fn request_scoped_provider_runs_once_per_request(mut container: Container) {
	// Arrange
	#[derive(Clone)]
	struct Connection(usize);
	#[derive(Clone)]
	struct Users(usize);
	#[derive(Clone)]
	struct Orders(usize);

	let opened = Arc::new(AtomicUsize::new(0));
	let counter = opened.clone();
	container
		.register(
			Dependency::from_request(move |_: &Request| {
				Ok(Connection(counter.fetch_add(1, Ordering::SeqCst)))
			})
			.request_scoped(),
		)
		.unwrap();
	container
		.register_func(|connection: Connection| Users(connection.0))
		.unwrap();
	container
		.register_func(|connection: Connection| Orders(connection.0))
		.unwrap();

	#[derive(Clone)]
	struct Both(usize, usize);
	container
		.register_func(|users: Users, orders: Orders| Both(users.0, orders.0))
		.unwrap();

	// Act
	let first: Both = container.inject(&request()).unwrap();
	let second: Both = container.inject(&request()).unwrap();

	// Assert
	assert_eq!(first.0, first.1);
	assert_eq!(second.0, second.1);
	assert_ne!(first.0, second.0);
	assert_eq!(opened.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn cloned_provider_keeps_its_own_request_memo(mut container: Container) {
	// Arrange
	#[derive(Clone)]
	struct Region(u8);
	#[derive(Clone)]
	struct Shard(u8);

	let shard = Dependency::func(|region: Region, _: Request| Shard(region.0)).request_scoped();
	container.register_value(Region(1)).unwrap();
	let first = container.register(shard.clone()).unwrap();
	container.register_value(Region(2)).unwrap();
	let second = container.register(shard).unwrap();
	let handler = container
		.handler(|a: Shard, b: Shard| async move { format!("{} {}", a.0, b.0) })
		.unwrap();

	// Act
	let response = handler.handle(request()).await;

	// Assert
	assert_ne!(first.id(), second.id());
	assert_eq!(response.body_text(), "2 1");
}

#[rstest]
fn payload_dependency_kind_and_scope(mut container: Container) {
	// Arrange
	#[derive(Clone, serde::Deserialize)]
	struct Form {
		#[allow(dead_code)]
		q: String,
	}

	// Act
	let payload = container.register_payload::<Form>().unwrap();

	// Assert
	assert_eq!(payload.kind(), DependencyKind::Payload);
	assert_eq!(payload.scope(), DependencyScope::Request);
}

#[rstest]
fn with_dependencies_registers_in_order() {
	// Arrange
	#[derive(Clone, Debug, PartialEq)]
	struct Level(u8);

	// Act
	let container = Container::with_dependencies(vec![
		Dependency::value(Level(1)),
		Dependency::value(Level(2)),
	])
	.unwrap();

	// Assert
	assert_eq!(container.inject::<Level>(&request()).unwrap(), Level(2));
}
