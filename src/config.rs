// ABOUTME: Crate-wide constants — the fixed builtin table's name list

/// The complete, fixed set of builtin names (§4.3). `eval::lookup_builtin` resolves
/// exactly these; tests assert against this list so the two can't drift apart.
pub const BUILTIN_NAMES: &[&str] = &["len", "puts", "first", "last", "rest", "push"];
