//! Compatibility bridge for class-style injectables.
//!
//! The older declaration style builds a value from an ordered constructor
//! parameter list instead of a factory closure. The bridge adapts such
//! classes onto the same resolver as functional injectables: registering a
//! class synthesizes an [`InjectKey`] whose factory resolves each declared
//! parameter in order and invokes the class constructor positionally, so
//! both styles coexist in one container and see the same overrides and memo
//! cache.
//!
//! Dependency inference is deliberately explicit: a class lists its
//! parameters as data ([`ClassParam`]) rather than relying on any runtime
//! reflection of the constructor signature.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tracing::warn;

use crate::error::{DiError, DiResult};
use crate::injector::{Injector, InjectorContext};
use crate::key::{InjectKey, RawKey};
use crate::registry::{self, AnyArc};

/// Marks a type as constructible by the container from an ordered parameter
/// list.
///
/// Implementing the trait is the declaration; calling
/// [`register_class`] is the definition-time side-channel that actually
/// records the class, mirroring how the older style marked classes at
/// definition time. Classes that were never registered fail adaptation with
/// [`DiError::NotInjectable`].
///
/// # Examples
///
/// ```rust
/// use overlay_di::{
///     register_class, ClassInjectable, ClassParam, ClassParams, DiResult, Injector,
/// };
/// use std::sync::Arc;
///
/// struct Clock;
///
/// impl ClassInjectable for Clock {
///     fn construct(_params: &mut ClassParams) -> DiResult<Self> {
///         Ok(Clock)
///     }
/// }
///
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
///
/// impl ClassInjectable for Scheduler {
///     fn parameters() -> Vec<ClassParam> {
///         vec![ClassParam::class::<Clock>()]
///     }
///
///     fn construct(params: &mut ClassParams) -> DiResult<Self> {
///         Ok(Scheduler { clock: params.take()? })
///     }
/// }
///
/// register_class::<Clock>();
/// register_class::<Scheduler>();
///
/// let injector = Injector::new();
/// let scheduler = injector.get_class_required::<Scheduler>();
/// assert!(Arc::ptr_eq(&scheduler.clock, &injector.get_class_required::<Clock>()));
/// ```
pub trait ClassInjectable: Send + Sync + Sized + 'static {
    /// Diagnostic name; defaults to the short type name.
    fn class_name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Ordered constructor parameters. Defaults to none.
    fn parameters() -> Vec<ClassParam> {
        Vec::new()
    }

    /// Invoked with the parameters resolved in declaration order.
    fn construct(params: &mut ClassParams) -> DiResult<Self>;
}

/// One constructor parameter of a class-style injectable.
pub struct ClassParam(ParamKind);

enum ParamKind {
    /// Another registered class, identified by constructor identity.
    Class(TypeId, &'static str),
    /// An explicit inject key, for parameters whose type does not uniquely
    /// determine the binding.
    Key(RawKey),
    /// The ambient container.
    Injector,
    /// A parameter with no inferable binding; warned about at registration
    /// and fatal if the class is actually constructed.
    Unknown(&'static str),
}

impl ClassParam {
    /// Dependency on another class-style injectable.
    pub fn class<T: ClassInjectable>() -> Self {
        Self(ParamKind::Class(TypeId::of::<T>(), T::class_name()))
    }

    /// Dependency on an explicit key.
    pub fn key<T: Send + Sync + 'static>(key: InjectKey<T>) -> Self {
        Self(ParamKind::Key(key.raw()))
    }

    /// Dependency on the ambient container, resolved through the same
    /// self-reference key as [`Injector::SELF`].
    pub fn injector() -> Self {
        Self(ParamKind::Injector)
    }

    /// A parameter whose binding could not be inferred. `type_hint` is the
    /// best available description for diagnostics.
    pub fn unknown(type_hint: &'static str) -> Self {
        Self(ParamKind::Unknown(type_hint))
    }
}

/// Positional cursor over a class's resolved constructor parameters.
///
/// [`ClassInjectable::construct`] consumes parameters with
/// [`take`](ClassParams::take) in declaration order.
pub struct ClassParams {
    class: &'static str,
    values: std::vec::IntoIter<AnyArc>,
    index: usize,
}

impl ClassParams {
    fn new(class: &'static str, values: Vec<AnyArc>) -> Self {
        Self {
            class,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Takes the next parameter, downcast to its declared value type.
    ///
    /// For a [`ClassParam::injector`] parameter the value type is
    /// [`Injector`].
    pub fn take<T: Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let index = self.index;
        self.index += 1;
        let value = self
            .values
            .next()
            .ok_or(DiError::UnresolvedParameter(self.class, index))?;
        value
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(type_name::<T>()))
    }
}

// Class table: constructor identity -> adapted key, populated once per class.
static CLASS_TABLE: Lazy<RwLock<HashMap<TypeId, RawKey>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a class-style injectable, minting (once) its adapted
/// [`InjectKey`].
///
/// Must be called before any container resolves the class, as part of the
/// declaration phase. Calling it again for the same class is a no-op
/// returning the already-minted key.
///
/// Parameters declared [`unknown`](ClassParam::unknown) are surfaced as a
/// warning here and only become an error if the class is actually
/// constructed.
pub fn register_class<T: ClassInjectable>() -> InjectKey<T> {
    let type_id = TypeId::of::<T>();
    if let Some(&raw) = CLASS_TABLE.read().unwrap().get(&type_id) {
        return InjectKey::from_raw(raw);
    }

    let name = T::class_name();
    let params = T::parameters();
    for (index, param) in params.iter().enumerate() {
        if let ParamKind::Unknown(type_hint) = param.0 {
            warn!(
                class = name,
                parameter = index,
                type_hint,
                "class parameter has no known binding; constructing this class will fail"
            );
        }
    }

    let factory = move |cx: &InjectorContext<'_>| -> DiResult<AnyArc> {
        let mut resolved = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            resolved.push(resolve_param(cx, name, index, param)?);
        }
        let mut cursor = ClassParams::new(name, resolved);
        let value = T::construct(&mut cursor)?;
        Ok(Arc::new(value) as AnyArc)
    };
    let raw = registry::register(name, Arc::new(factory));

    // Another thread may have registered concurrently; the table entry wins
    // and the losing registry entry is simply never referenced.
    let mut table = CLASS_TABLE.write().unwrap();
    InjectKey::from_raw(*table.entry(type_id).or_insert(raw))
}

/// Adapts a registered class to its [`InjectKey`].
///
/// # Errors
///
/// [`DiError::NotInjectable`] if [`register_class`] was never called for
/// `T`.
pub fn class_key<T: ClassInjectable>() -> DiResult<InjectKey<T>> {
    class_raw(TypeId::of::<T>())
        .map(InjectKey::from_raw)
        .ok_or(DiError::NotInjectable(T::class_name()))
}

fn class_raw(type_id: TypeId) -> Option<RawKey> {
    CLASS_TABLE.read().unwrap().get(&type_id).copied()
}

fn resolve_param(
    cx: &InjectorContext<'_>,
    class: &'static str,
    index: usize,
    param: &ClassParam,
) -> DiResult<AnyArc> {
    match param.0 {
        ParamKind::Class(type_id, dep_name) => {
            let raw = class_raw(type_id).ok_or(DiError::NotInjectable(dep_name))?;
            cx.resolve_raw(raw)
        }
        ParamKind::Key(raw) => cx.resolve_raw(raw),
        ParamKind::Injector => cx.resolve_raw(Injector::SELF.raw()),
        ParamKind::Unknown(_) => Err(DiError::UnresolvedParameter(class, index)),
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
