//! ID generation utilities.

use uuid::Uuid;

/// Generate a unique run ID, used to correlate the cycles of one call chain.
///
/// ```rust
/// use tongyi_core::identifier::generate_run_id;
///
/// let id = generate_run_id();
/// assert!(id.starts_with("run_"));
/// assert_eq!(id.len(), 36);
/// ```
#[must_use]
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}
