//! Inject keys identifying bindable values.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reserved id for the container's self-reference key.
pub(crate) const SELF_KEY_ID: u64 = 0;

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_key_id() -> u64 {
    NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Untyped key identity: a process-unique id plus a diagnostic name.
///
/// The id alone is the identity; the name exists for error messages and
/// debug dumps and is not required to be unique.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawKey {
    id: u64,
    name: &'static str,
}

impl RawKey {
    pub(crate) const fn new(id: u64, name: &'static str) -> Self {
        Self { id, name }
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for RawKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RawKey {}

impl Hash for RawKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Opaque token identifying one bindable, lazily-constructed value.
///
/// An `InjectKey<T>` is minted by [`injectable`](crate::injectable) (or its
/// positional-dependency sibling [`injectable_with`](crate::injectable_with))
/// and statically ties the key to the value type `T` produced by the
/// registered factory. Keys carry no runtime type information; the type
/// association is purely phantom and the identity is a process-unique id.
///
/// Keys are `Copy` regardless of `T`, so they are cheap to capture in factory
/// closures and to store in `static`s for module-level declaration:
///
/// ```rust
/// use once_cell::sync::Lazy;
/// use overlay_di::{injectable, InjectKey, Injector};
///
/// struct Config { url: String }
///
/// static CONFIG: Lazy<InjectKey<Config>> = Lazy::new(|| {
///     injectable("Config", |_| Config { url: "localhost".to_string() })
/// });
///
/// let injector = Injector::new();
/// assert_eq!(injector.get_required(*CONFIG).url, "localhost");
/// ```
///
/// The diagnostic name supplied at declaration is not required to be unique;
/// it is used only in error messages and debug output.
pub struct InjectKey<T> {
    raw: RawKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InjectKey<T> {
    pub(crate) const fn from_raw(raw: RawKey) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub(crate) fn raw(&self) -> RawKey {
        self.raw
    }

    /// The diagnostic name supplied at declaration time.
    pub fn name(&self) -> &'static str {
        self.raw.name()
    }
}

// Manual impls: the derived versions would bound on `T: Clone`/`T: Copy`,
// but a key is just an id and is copyable for any value type.
impl<T> Clone for InjectKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InjectKey<T> {}

impl<T> PartialEq for InjectKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for InjectKey<T> {}

impl<T> Hash for InjectKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for InjectKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InjectKey({}#{})", self.raw.name(), self.raw.id())
    }
}
