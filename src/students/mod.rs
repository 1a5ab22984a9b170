//! Student records: the data model, request validation, and the concurrent in-memory store.

mod store;
pub mod types;
mod validation;

pub use store::StudentStore;
pub use types::{NewStudent, StoreError, Student, StudentId, ValidationError};
pub use validation::validate_student;
