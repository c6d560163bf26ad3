//! Shared fixtures for router integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use sentier_router::{GuardResult, MemoryHistory, Router, RouterOptions};
use sentier_routes::{Params, Route, RouteTree};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Installs a test subscriber once; `RUST_LOG=sentier_router=debug` shows
/// transition progress.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// The application tree used across the router tests.
pub fn routes() -> RouteTree {
	RouteTree::builder()
		.route(Route::new("home", "/home"))
		.route(
			Route::new("users", "/users")
				.child(Route::new("view", "/view/{id}"))
				.child(Route::new("list", "/list")),
		)
		.route(
			Route::new("orders", "/orders")
				.child(Route::new("pending", "/pending"))
				.child(Route::new("completed", "/completed"))
				.child(Route::new("view", "/view/{id}")),
		)
		.route(
			Route::new("section", r"/{section:section\d+}")
				.child(Route::new("view", "/view/{id}"))
				.child(Route::new("query", "/query?param2&param3")),
		)
		.route(Route::new("admin", "/admin"))
		.build()
		.unwrap()
}

/// A router at `path` without a default route. `admin` refuses activation.
pub fn bare_router_at(path: &str) -> (Router, Arc<MemoryHistory>) {
	init_tracing();
	let history = Arc::new(MemoryHistory::new(path));
	let router = Router::with_history(routes(), Arc::clone(&history) as _);
	router.can_activate("admin", |_, _| GuardResult::Ready(false));
	(router, history)
}

/// Same as [`bare_router_at`] with `home` as the default route.
pub fn router_at(path: &str) -> (Router, Arc<MemoryHistory>) {
	let (router, history) = bare_router_at(path);
	let router =
		router.with_options(RouterOptions::new().with_default_route("home", Params::new()));
	(router, history)
}

/// Ordered log of events written by callbacks.
#[derive(Clone, Default)]
pub struct Recorder {
	events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&self, event: impl Into<String>) {
		self.events.lock().push(event.into());
	}

	pub fn events(&self) -> Vec<String> {
		self.events.lock().clone()
	}

	pub fn count(&self) -> usize {
		self.events.lock().len()
	}

	pub fn clear(&self) {
		self.events.lock().clear();
	}
}

/// Log lines captured from a scoped subscriber.
#[derive(Clone, Default)]
pub struct LogCapture {
	buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
	/// Runs `f` on this thread with a subscriber recording `WARN` and above.
	pub fn warnings<R>(f: impl FnOnce() -> R) -> (R, Self) {
		let capture = Self::default();
		let subscriber = tracing_subscriber::fmt()
			.with_writer(capture.clone())
			.with_max_level(tracing::Level::WARN)
			.with_ansi(false)
			.without_time()
			.finish();
		let result = tracing::subscriber::with_default(subscriber, f);
		(result, capture)
	}

	pub fn lines(&self) -> Vec<String> {
		String::from_utf8_lossy(&self.buffer.lock())
			.lines()
			.map(str::to_string)
			.collect()
	}

	/// Returns the `WARN` lines mentioning `needle`.
	pub fn warnings_about(&self, needle: &str) -> Vec<String> {
		self.lines()
			.into_iter()
			.filter(|line| line.contains("WARN") && line.contains(needle))
			.collect()
	}
}

impl io::Write for LogCapture {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.buffer.lock().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl<'a> MakeWriter<'a> for LogCapture {
	type Writer = Self;

	fn make_writer(&'a self) -> Self::Writer {
		self.clone()
	}
}
