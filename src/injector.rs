//! The injector: per-container override table, memo cache, and the
//! resolution algorithm.

use std::collections::HashMap;
use std::fmt;
use std::panic;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::bridge::{self, ClassInjectable};
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_catch;
use crate::key::{InjectKey, RawKey, SELF_KEY_ID};
use crate::overrides::Override;
use crate::registry::{self, AnyArc};

/// A resolver instance holding one set of overrides and one memoization
/// cache.
///
/// Values are constructed lazily on first request and memoized per
/// container: for a fixed injector, `get(key)` returns the pointer-identical
/// `Arc` on every call, and a factory's side effects run at most once. Two
/// injectors constructed with different overrides resolve independently, so
/// tests can substitute bindings without touching each other.
///
/// `Injector` is cheaply clonable (`Arc` inner); clones share the override
/// table and the cache and are the same container for identity purposes
/// ([`ptr_eq`](Injector::ptr_eq)).
///
/// # Thread safety
///
/// The container is `Send + Sync`; the memo cache is lock-protected and the
/// first value inserted for a key wins, so the singleton property holds even
/// if two threads race the same factory. Resolution is designed for a single
/// logical thread of control, though; racing threads may each run a losing
/// factory whose result is then discarded.
///
/// # Examples
///
/// ```rust
/// use overlay_di::{injectable, Injector};
/// use std::sync::Arc;
///
/// struct Config { retries: u32 }
///
/// let config = injectable("Config", |_| Config { retries: 3 });
///
/// let injector = Injector::new();
/// let first = injector.get_required(config);
/// let second = injector.get_required(config);
/// assert!(Arc::ptr_eq(&first, &second)); // Same instance
/// ```
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    /// Override table, immutable for the container's lifetime.
    overrides: HashMap<u64, RawKey>,
    /// Original override list, kept for debug output.
    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    override_list: Vec<Override>,
    /// Memo cache; at most one resolved value per key.
    instances: Mutex<HashMap<u64, AnyArc>>,
    /// Weak slot backing the self-reference key, so repeated `get(SELF)`
    /// calls return a pointer-identical handle without the container
    /// strongly retaining itself.
    self_handle: Mutex<Weak<Injector>>,
}

impl Injector {
    /// The well-known self-reference key.
    ///
    /// Resolves to a handle sharing this container's state, letting an
    /// injectable hold on to the ambient injector for deferred lookups. This
    /// is a base case of resolution: it consults neither the override table
    /// nor the registry, so the self key cannot be overridden.
    ///
    /// Note that a cached value holding the handle while itself being held
    /// by the container's cache forms an `Arc` cycle the caller owns; drop
    /// such values (or the container) deliberately in long-lived processes
    /// that churn containers.
    pub const SELF: InjectKey<Injector> = InjectKey::from_raw(RawKey::new(SELF_KEY_ID, "Injector"));

    /// Creates a container with no overrides.
    pub fn new() -> Self {
        Self::with_overrides([])
    }

    /// Creates a container with the given overrides.
    ///
    /// The table is fixed for the container's lifetime. If the same key is
    /// overridden twice, the later entry wins.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use overlay_di::{injectable, override_key, Injector};
    ///
    /// struct Greeting(&'static str);
    ///
    /// let real = injectable("Greeting", |_| Greeting("hello"));
    /// let fake = injectable("TestGreeting", |_| Greeting("hi from the test"));
    ///
    /// let injector = Injector::with_overrides([override_key(real).with_other(fake)]);
    /// assert_eq!(injector.get_required(real).0, "hi from the test");
    /// ```
    pub fn with_overrides(overrides: impl IntoIterator<Item = Override>) -> Self {
        let override_list: Vec<Override> = overrides.into_iter().collect();
        let mut table = HashMap::with_capacity(override_list.len());
        for entry in &override_list {
            table.insert(entry.overridden.id(), entry.overrider);
        }
        Self {
            inner: Arc::new(InjectorInner {
                overrides: table,
                override_list,
                instances: Mutex::new(HashMap::new()),
                self_handle: Mutex::new(Weak::new()),
            }),
        }
    }

    /// Resolves a key to its memoized value.
    ///
    /// Applies this container's overrides transitively, then returns the
    /// cached instance or runs the registered factory and caches the result.
    /// Factories observe the same container, so their own lookups respect
    /// the overrides and share the cache.
    ///
    /// # Errors
    ///
    /// [`DiError::CircularOverride`] if the override chain revisits a key,
    /// [`DiError::Circular`] if a factory transitively requests a key that
    /// is still being constructed, and [`DiError::UnknownKey`] /
    /// [`DiError::NotInjectable`] / [`DiError::UnresolvedParameter`] for
    /// configuration mistakes reached through the factory. A failed factory
    /// caches nothing, so a later call retries it.
    pub fn get<T: Send + Sync + 'static>(&self, key: InjectKey<T>) -> DiResult<Arc<T>> {
        let any = self.resolve_raw(key.raw())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(key.name()))
    }

    /// Resolves a key, panicking on failure.
    ///
    /// Convenience wrapper over [`get`](Injector::get) for call sites that
    /// treat resolution failure as a fatal configuration error.
    pub fn get_required<T: Send + Sync + 'static>(&self, key: InjectKey<T>) -> Arc<T> {
        self.get(key)
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", key.name(), e))
    }

    /// Resolves a class-style injectable registered through the
    /// compatibility bridge.
    ///
    /// Equivalent to adapting the class to its [`InjectKey`] via
    /// [`class_key`](crate::class_key) and resolving that key, so overrides
    /// and the memo cache apply exactly as for functional injectables.
    ///
    /// # Errors
    ///
    /// [`DiError::NotInjectable`] if `T` was never passed to
    /// [`register_class`](crate::register_class), plus any error the class
    /// factory itself can produce.
    pub fn get_class<T: ClassInjectable>(&self) -> DiResult<Arc<T>> {
        self.get(bridge::class_key::<T>()?)
    }

    /// Resolves a class-style injectable, panicking on failure.
    pub fn get_class_required<T: ClassInjectable>(&self) -> Arc<T> {
        self.get_class::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", T::class_name(), e))
    }

    /// Whether two handles refer to the same container.
    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Handle for the self-reference key. Memoized through a weak slot:
    /// callers holding the previous handle get it back pointer-identical;
    /// once all copies drop, a fresh one is minted against the same state.
    fn self_handle(&self) -> Arc<Injector> {
        let mut slot = self.inner.self_handle.lock().unwrap();
        if let Some(existing) = slot.upgrade() {
            return existing;
        }
        let handle = Arc::new(self.clone());
        *slot = Arc::downgrade(&handle);
        handle
    }

    pub(crate) fn resolve_raw(&self, key: RawKey) -> DiResult<AnyArc> {
        let mut chain = Vec::new();
        self.resolve_chained(key, &mut chain)
    }

    /// One step of resolution. `chain` records the override keys already
    /// followed in this request, for cycle detection and error reporting.
    fn resolve_chained(&self, key: RawKey, chain: &mut Vec<RawKey>) -> DiResult<AnyArc> {
        // Base case: the self key never consults overrides or the registry.
        if key.id() == SELF_KEY_ID {
            return Ok(self.self_handle() as AnyArc);
        }

        if let Some(hit) = self.inner.instances.lock().unwrap().get(&key.id()) {
            return Ok(hit.clone());
        }

        let value = match self.inner.overrides.get(&key.id()) {
            Some(&next) => {
                chain.push(key);
                if chain.iter().any(|visited| visited.id() == next.id()) {
                    chain.push(next);
                    return Err(DiError::CircularOverride(
                        chain.iter().map(|k| k.name()).collect(),
                    ));
                }
                self.resolve_chained(next, chain)?
            }
            None => {
                let factory = registry::factory_for(key)?;
                debug!(key = key.name(), "constructing injectable");
                with_circular_catch(key, || {
                    let cx = InjectorContext::new(self);
                    factory(&cx)
                })?
            }
        };

        // Cache under the requested key as well as every key along the
        // override chain (each recursion frame inserts its own), so repeat
        // lookups from either end of the chain are cheap and identical. The
        // lock is never held across the factory; first writer wins so racing
        // resolutions still agree on one instance.
        let mut cache = self.inner.instances.lock().unwrap();
        Ok(cache.entry(key.id()).or_insert(value).clone())
    }

    /// Render the override table and cache occupancy for debugging.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Injector Debug ===\n");
        s.push_str("Overrides:\n");
        for entry in &self.inner.override_list {
            s.push_str(&format!(
                "  {} -> {}\n",
                entry.overridden_name(),
                entry.overrider_name()
            ));
        }
        let cache = self.inner.instances.lock().unwrap();
        s.push_str(&format!("Cached instances: {}\n", cache.len()));
        s
    }
}

impl Clone for Injector {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("overrides", &self.inner.overrides.len())
            .field(
                "cached_instances",
                &self.inner.instances.lock().unwrap().len(),
            )
            .finish()
    }
}

/// Inject capability passed to factory functions.
///
/// Wraps the requesting container; lookups made through it re-enter the
/// container's resolution algorithm, so ad hoc requests respect overrides
/// and share the memo cache with direct `get` calls.
///
/// # Examples
///
/// ```rust
/// use overlay_di::{injectable, Injector};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let database = injectable("Database", |_| Database {
///     url: "postgres://localhost".to_string(),
/// });
/// let users = injectable("UserService", move |cx| {
///     // cx is an InjectorContext resolving against the requesting container
///     UserService { db: cx.get_required(database) }
/// });
///
/// let injector = Injector::new();
/// assert_eq!(injector.get_required(users).db.url, "postgres://localhost");
/// ```
pub struct InjectorContext<'a> {
    injector: &'a Injector,
}

impl<'a> InjectorContext<'a> {
    pub(crate) fn new(injector: &'a Injector) -> Self {
        Self { injector }
    }

    /// Resolves a key against the requesting container.
    pub fn get<T: Send + Sync + 'static>(&self, key: InjectKey<T>) -> DiResult<Arc<T>> {
        self.injector.get(key)
    }

    /// Resolves a key, treating failure as fatal.
    ///
    /// The failure unwinds with the `DiError` as payload and is converted
    /// back into an `Err` by the enclosing resolution frame, so it surfaces
    /// as an ordinary error from the outermost public `get`.
    pub fn get_required<T: Send + Sync + 'static>(&self, key: InjectKey<T>) -> Arc<T> {
        match self.get(key) {
            Ok(value) => value,
            Err(e) => panic::panic_any(e),
        }
    }

    /// Resolves a class-style injectable against the requesting container.
    pub fn get_class<T: ClassInjectable>(&self) -> DiResult<Arc<T>> {
        self.injector.get_class::<T>()
    }

    /// Resolves a class-style injectable, treating failure as fatal.
    pub fn get_class_required<T: ClassInjectable>(&self) -> Arc<T> {
        match self.get_class::<T>() {
            Ok(value) => value,
            Err(e) => panic::panic_any(e),
        }
    }

    pub(crate) fn resolve_raw(&self, key: RawKey) -> DiResult<AnyArc> {
        self.injector.resolve_raw(key)
    }
}
