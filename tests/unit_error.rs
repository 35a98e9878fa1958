use overlay_di::DiError;

#[test]
fn test_unknown_key_display() {
    let err = DiError::UnknownKey("Database");
    assert_eq!(err.to_string(), "No injectable registered for key: Database");
}

#[test]
fn test_circular_display() {
    let err = DiError::Circular(vec!["X", "Y", "X"]);
    assert_eq!(err.to_string(), "Circular dependency: X -> Y -> X");
}

#[test]
fn test_circular_override_display() {
    let err = DiError::CircularOverride(vec!["A", "A2", "A3", "A"]);
    assert_eq!(
        err.to_string(),
        "Circular override dependencies: A -> A2 -> A3 -> A"
    );
}

#[test]
fn test_depth_exceeded_display() {
    let err = DiError::DepthExceeded(1024);
    assert_eq!(err.to_string(), "Max depth 1024 exceeded");
}

#[test]
fn test_not_injectable_display() {
    let err = DiError::NotInjectable("LegacyService");
    assert_eq!(
        err.to_string(),
        "LegacyService is not registered as a class injectable"
    );
}

#[test]
fn test_unresolved_parameter_display() {
    let err = DiError::UnresolvedParameter("LegacyService", 2);
    assert_eq!(
        err.to_string(),
        "Cannot construct LegacyService: parameter 2 has no known binding"
    );
}

#[test]
fn test_errors_are_std_errors() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    assert_error(&DiError::TypeMismatch("u32"));
}
