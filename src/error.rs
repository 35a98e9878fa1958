//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur during declaration,
/// override resolution, or value construction in overlay-di.
///
/// All of these are configuration errors: they indicate a programming
/// mistake, are surfaced synchronously from [`Injector::get`] or
/// [`Injector::get_class`], and are never retried internally. A factory that
/// fails leaves nothing in the memo cache, so a later `get` call runs it
/// again.
///
/// [`Injector::get`]: crate::Injector::get
/// [`Injector::get_class`]: crate::Injector::get_class
///
/// # Examples
///
/// ```rust
/// use overlay_di::DiError;
///
/// let cycle = DiError::CircularOverride(vec!["A", "A2", "A3", "A"]);
/// assert_eq!(
///     cycle.to_string(),
///     "Circular override dependencies: A -> A2 -> A3 -> A"
/// );
///
/// let unknown = DiError::UnknownKey("Database");
/// println!("Error: {}", unknown);
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No registration entry exists for the key
    UnknownKey(&'static str),
    /// A factory requested a key that is already being constructed (includes path)
    Circular(Vec<&'static str>),
    /// An override chain revisits a key (includes the chain in visitation order)
    CircularOverride(Vec<&'static str>),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// A class was adapted without a prior `register_class` call
    NotInjectable(&'static str),
    /// A class parameter declared `unknown` was needed during construction
    UnresolvedParameter(&'static str, usize),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::UnknownKey(name) => write!(f, "No injectable registered for key: {}", name),
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::CircularOverride(chain) => {
                write!(f, "Circular override dependencies: {}", chain.join(" -> "))
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::NotInjectable(name) => {
                write!(f, "{} is not registered as a class injectable", name)
            }
            DiError::UnresolvedParameter(class, index) => {
                write!(
                    f,
                    "Cannot construct {}: parameter {} has no known binding",
                    class, index
                )
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout
/// overlay-di to reduce boilerplate in function signatures.
pub type DiResult<T> = Result<T, DiError>;
