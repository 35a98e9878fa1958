//! Process-global injectable registry.
//!
//! Declaration is a load-time phase: every [`injectable`] /
//! [`injectable_with`] call must complete before the first `get` on any
//! container. The registry owns its entries for the process lifetime and an
//! entry is never mutated or dropped after insertion.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::{DiError, DiResult};
use crate::injector::InjectorContext;
use crate::key::{next_key_id, InjectKey, RawKey};

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased construction recipe stored per key.
pub(crate) type Factory =
    Arc<dyn for<'a> Fn(&InjectorContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

struct Entry {
    factory: Factory,
}

static REGISTRY: Lazy<RwLock<HashMap<u64, Entry>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Insert a new entry and mint its key.
pub(crate) fn register(name: &'static str, factory: Factory) -> RawKey {
    let raw = RawKey::new(next_key_id(), name);
    REGISTRY
        .write()
        .unwrap()
        .insert(raw.id(), Entry { factory });
    raw
}

/// Look up a key's factory, cloned out so the registry lock is never held
/// while a factory runs.
pub(crate) fn factory_for(key: RawKey) -> DiResult<Factory> {
    REGISTRY
        .read()
        .unwrap()
        .get(&key.id())
        .map(|entry| entry.factory.clone())
        .ok_or(DiError::UnknownKey(key.name()))
}

/// Declares an injectable with an ad hoc factory.
///
/// The factory receives an [`InjectorContext`] and may call
/// [`get`](InjectorContext::get) / [`get_required`](InjectorContext::get_required)
/// at arbitrary points, including conditionally or in a loop; dependencies do
/// not have to be known until the factory executes. Those lookups re-enter
/// the requesting container's resolution algorithm, so they respect its
/// overrides and share its memo cache.
///
/// Declaration has no side effect beyond the registry insertion: the factory
/// is not invoked until the key is first resolved on some container.
///
/// # Examples
///
/// ```rust
/// use overlay_di::{injectable, Injector};
///
/// struct Database { url: String }
/// struct UserService { db_url: String }
///
/// let database = injectable("Database", |_| Database {
///     url: "postgres://localhost".to_string(),
/// });
/// let users = injectable("UserService", move |cx| UserService {
///     db_url: cx.get_required(database).url.clone(),
/// });
///
/// let injector = Injector::new();
/// assert_eq!(injector.get_required(users).db_url, "postgres://localhost");
/// ```
pub fn injectable<T, F>(name: &'static str, factory: F) -> InjectKey<T>
where
    T: Send + Sync + 'static,
    F: for<'a> Fn(&InjectorContext<'a>) -> T + Send + Sync + 'static,
{
    let raw = register(
        name,
        Arc::new(move |cx: &InjectorContext<'_>| Ok(Arc::new(factory(cx)) as AnyArc)),
    );
    InjectKey::from_raw(raw)
}

/// Declares an injectable with an explicit ordered dependency list.
///
/// `deps` is a single key or a tuple of keys; the factory receives the
/// already-resolved values in the declared order instead of an inject
/// capability.
///
/// # Examples
///
/// ```rust
/// use overlay_di::{injectable, injectable_with, Injector};
///
/// struct Config { port: u16 }
/// struct Server { addr: String }
///
/// let config = injectable("Config", |_| Config { port: 8080 });
/// let server = injectable_with("Server", config, |config| Server {
///     addr: format!("0.0.0.0:{}", config.port),
/// });
///
/// let injector = Injector::new();
/// assert_eq!(injector.get_required(server).addr, "0.0.0.0:8080");
/// ```
pub fn injectable_with<T, D, F>(name: &'static str, deps: D, factory: F) -> InjectKey<T>
where
    T: Send + Sync + 'static,
    D: DepList,
    F: Fn(D::Resolved) -> T + Send + Sync + 'static,
{
    let raw = register(
        name,
        Arc::new(move |cx: &InjectorContext<'_>| {
            Ok(Arc::new(factory(deps.resolve(cx)?)) as AnyArc)
        }),
    );
    InjectKey::from_raw(raw)
}

/// Register an anonymous injectable whose factory hands out the given value.
/// Backs `OverrideBuilder::with_value`.
pub(crate) fn register_value<T: Send + Sync + 'static>(
    name: &'static str,
    value: T,
) -> InjectKey<T> {
    let slot: AnyArc = Arc::new(value);
    let raw = register(name, Arc::new(move |_: &InjectorContext<'_>| Ok(slot.clone())));
    InjectKey::from_raw(raw)
}

/// Ordered dependency list for [`injectable_with`].
///
/// Implemented for a bare `InjectKey<T>` and for tuples of keys up to eight
/// elements; `Resolved` is the matching value (or tuple of values), each
/// wrapped in `Arc`.
pub trait DepList: Copy + Send + Sync + 'static {
    /// The resolved shape handed to the factory.
    type Resolved;

    /// Resolve every declared key, in order, against the requesting container.
    fn resolve(&self, cx: &InjectorContext<'_>) -> DiResult<Self::Resolved>;
}

impl<T: Send + Sync + 'static> DepList for InjectKey<T> {
    type Resolved = Arc<T>;

    fn resolve(&self, cx: &InjectorContext<'_>) -> DiResult<Self::Resolved> {
        cx.get(*self)
    }
}

macro_rules! impl_dep_list {
    ($($ty:ident . $idx:tt),+) => {
        impl<$($ty: Send + Sync + 'static),+> DepList for ($(InjectKey<$ty>,)+) {
            type Resolved = ($(Arc<$ty>,)+);

            fn resolve(&self, cx: &InjectorContext<'_>) -> DiResult<Self::Resolved> {
                Ok(($(cx.get(self.$idx)?,)+))
            }
        }
    };
}

impl_dep_list!(T0.0);
impl_dep_list!(T0.0, T1.1);
impl_dep_list!(T0.0, T1.1, T2.2);
impl_dep_list!(T0.0, T1.1, T2.2, T3.3);
impl_dep_list!(T0.0, T1.1, T2.2, T3.3, T4.4);
impl_dep_list!(T0.0, T1.1, T2.2, T3.3, T4.4, T5.5);
impl_dep_list!(T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6);
impl_dep_list!(T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6, T7.7);
