use thiserror::Error;

/// Typed failures raised by the catalog and the query algebra.
/// Everything else (I/O, lock timeouts) surfaces as an opaque anyhow error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbError {
    /// Unknown table or field at plan construction time.
    #[error("not in catalog: {0}")]
    CatalogLookup(String),
    /// Invalid projection field or colliding product field names.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Comparison between constants of different types.
    #[error("type mismatch: cannot compare {0} with {1}")]
    TypeMismatch(String, String),
    /// Field read through a scan that does not expose it.
    #[error("field not visible from this scan: {0}")]
    FieldAccess(String),
}
