//! # overlay-di
//!
//! Keyed, override-friendly dependency injection for Rust with lazy
//! per-container singletons.
//!
//! ## Features
//!
//! - **Opaque typed keys**: [`InjectKey<T>`] tokens minted at declaration
//!   time, phantom-typed to the value the factory produces
//! - **Lazy singletons**: factories run on first request, memoized per
//!   container; reference identity holds across repeated `get` calls
//! - **Per-container overrides**: redirect a key to another key or to a
//!   literal value, transitively, with cycle detection and full-chain error
//!   messages
//! - **Ad hoc injection**: factories receive an [`InjectorContext`] and may
//!   request dependencies conditionally or in loops
//! - **Class compatibility bridge**: older class-style declarations resolve
//!   through the same algorithm as functional injectables
//! - **Circular dependency detection**: initialization cycles fail with a
//!   detailed path instead of exhausting the stack
//!
//! ## Quick Start
//!
//! ```rust
//! use overlay_di::{injectable, override_key, Injector};
//! use std::sync::Arc;
//!
//! // Declare injectables (load phase: before any container resolves them)
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let database = injectable("Database", |_| Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! let user_service = injectable("UserService", move |cx| UserService {
//!     db: cx.get_required(database),
//! });
//!
//! // Resolve through a container
//! let injector = Injector::new();
//! let users = injector.get_required(user_service);
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//!
//! // A second container can substitute bindings without touching the first
//! let test_injector = Injector::with_overrides([
//!     override_key(database).with_value(Database {
//!         connection_string: "sqlite::memory:".to_string(),
//!     }),
//! ]);
//! let test_users = test_injector.get_required(user_service);
//! assert_eq!(test_users.db.connection_string, "sqlite::memory:");
//! ```
//!
//! ## Declaration vs. resolution
//!
//! Declaration ([`injectable`], [`injectable_with`], [`register_class`])
//! records entries in a process-global registry and must complete before the
//! first `get` on any container. The idiomatic shape is a `Lazy` static per
//! key, which makes declaration a module-load concern exactly like the
//! containers expect. Resolution is per container: each [`Injector`] holds
//! its own override table and memo cache, so two containers never share
//! instances.
//!
//! ## Overrides
//!
//! ```rust
//! use overlay_di::{injectable, override_key, Injector};
//!
//! struct Greeter { greeting: &'static str }
//!
//! let greeter = injectable("Greeter", |_| Greeter { greeting: "hello" });
//! let loud = injectable("LoudGreeter", |_| Greeter { greeting: "HELLO" });
//!
//! let injector = Injector::with_overrides([override_key(greeter).with_other(loud)]);
//! assert_eq!(injector.get_required(greeter).greeting, "HELLO");
//! ```
//!
//! Overrides apply to transitive dependencies too: an injectable that
//! depends on `greeter` sees `loud`'s value in the container above, whether
//! it declared the dependency positionally or requested it ad hoc.

// Module declarations
pub mod bridge;
pub mod error;
pub mod injector;
pub mod key;
pub mod overrides;
pub mod registry;

// Internal modules
mod internal;

// Re-export core types
pub use bridge::{class_key, register_class, ClassInjectable, ClassParam, ClassParams};
pub use error::{DiError, DiResult};
pub use injector::{Injector, InjectorContext};
pub use key::InjectKey;
pub use overrides::{override_key, Override, OverrideBuilder};
pub use registry::{injectable, injectable_with, DepList};
