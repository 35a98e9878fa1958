//! Per-container binding overrides.

use crate::key::{InjectKey, RawKey};
use crate::registry;

/// A per-container substitution of one key's implementation for another's.
///
/// Built with [`override_key`]; supplied to
/// [`Injector::with_overrides`](crate::Injector::with_overrides). Overrides
/// are resolved transitively: with A overridden by B and B overridden by C,
/// resolving A yields C's value. A chain that revisits a key fails fast with
/// [`DiError::CircularOverride`](crate::DiError::CircularOverride).
#[derive(Debug, Clone, Copy)]
pub struct Override {
    pub(crate) overridden: RawKey,
    pub(crate) overrider: RawKey,
}

impl Override {
    /// Diagnostic name of the key being replaced.
    pub fn overridden_name(&self) -> &'static str {
        self.overridden.name()
    }

    /// Diagnostic name of the replacement key.
    pub fn overrider_name(&self) -> &'static str {
        self.overrider.name()
    }
}

/// Builder returned by [`override_key`].
pub struct OverrideBuilder<T> {
    key: InjectKey<T>,
}

impl<T: Send + Sync + 'static> OverrideBuilder<T> {
    /// Redirect the key to another key producing the same value type.
    pub fn with_other(self, other: InjectKey<T>) -> Override {
        Override {
            overridden: self.key.raw(),
            overrider: other.raw(),
        }
    }

    /// Redirect the key to a literal value.
    ///
    /// Sugar for [`with_other`](Self::with_other) against an anonymous
    /// injectable whose factory hands out `value`; the anonymous entry reuses
    /// the overridden key's diagnostic name.
    pub fn with_value(self, value: T) -> Override {
        let key = registry::register_value(self.key.name(), value);
        self.with_other(key)
    }
}

/// Start building an [`Override`] for `key`.
///
/// # Examples
///
/// ```rust
/// use overlay_di::{injectable, override_key, Injector};
///
/// struct Flag(bool);
///
/// let flag = injectable("Flag", |_| Flag(false));
///
/// let injector = Injector::with_overrides([override_key(flag).with_value(Flag(true))]);
/// assert!(injector.get_required(flag).0);
///
/// // A container without the override still sees the declared factory.
/// assert!(!Injector::new().get_required(flag).0);
/// ```
pub fn override_key<T: Send + Sync + 'static>(key: InjectKey<T>) -> OverrideBuilder<T> {
    OverrideBuilder { key }
}
