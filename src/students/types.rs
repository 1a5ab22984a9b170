//! Core data types and error definitions for student records.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Identifier assigned to a student by the store.
pub type StudentId = u64;

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Identifier assigned on creation; never changes afterwards.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Contact address. Only presence is checked.
    pub email: String,
}

/// Request body accepted by create and update.
///
/// Absent or `null` fields fall back to empty values so the validator, not the JSON decoder,
/// reports them. Unknown fields such as a client-supplied `id` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewStudent {
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Age in years; must be positive.
    #[serde(deserialize_with = "null_as_default")]
    pub age: i64,
    /// Contact address.
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NewStudent {
    /// Attach an identifier, producing the stored form of this record.
    pub fn with_id(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            age: self.age,
            email: self.email,
        }
    }
}

/// Validation failures, reported one at a time in name → age → email order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `name` was empty or missing.
    #[error("name is required")]
    NameRequired,
    /// `age` was zero, negative, or missing.
    #[error("age must be a positive number")]
    InvalidAge,
    /// `email` was empty or missing.
    #[error("email is required")]
    EmailRequired,
}

/// Errors returned by [`crate::students::StudentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record exists under the requested identifier.
    #[error("student {0} not found")]
    NotFound(StudentId),
}
