//! Concurrent in-memory student store.

use super::types::{NewStudent, StoreError, Student, StudentId};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Shared record map plus the identifier sequence.
///
/// Readers share the lock; every mutation takes it exclusively. Identifiers start at 1, grow
/// strictly, and are never handed out twice even after the record is deleted. Reads return
/// clones so callers never hold references into the map. Share the store through an `Arc`.
#[derive(Debug)]
pub struct StudentStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    students: BTreeMap<StudentId, Student>,
    next_id: StudentId,
}

impl Default for StudentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentStore {
    /// Create an empty store whose first identifier will be 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                students: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Return every stored record in ascending identifier order.
    pub fn list(&self) -> Vec<Student> {
        self.inner.read().students.values().cloned().collect()
    }

    /// Fetch a single record.
    pub fn get(&self, id: StudentId) -> Result<Student, StoreError> {
        self.inner
            .read()
            .students
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Insert a record under the next identifier and return the stored copy.
    pub fn create(&self, student: NewStudent) -> Student {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let stored = student.with_id(id);
        inner.students.insert(id, stored.clone());
        stored
    }

    /// Replace every field of an existing record except its identifier.
    pub fn update(&self, id: StudentId, student: NewStudent) -> Result<Student, StoreError> {
        let mut inner = self.inner.write();
        let slot = inner
            .students
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = student.with_id(id);
        Ok(slot.clone())
    }

    /// Remove a record.
    pub fn delete(&self, id: StudentId) -> Result<(), StoreError> {
        self.inner
            .write()
            .students
            .remove(&id)
            .map(drop)
            .ok_or(StoreError::NotFound(id))
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.read().students.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
