//! # DirtyTracker
//! A DirtyTracker is a wrapper around any value that remembers whether it was changed since
//! it was last written out. Callers mutate through [`DirtyTracker::value_mut`], and a later
//! [`DirtyTracker::take_dirty`] tells them whether a write-back is due.

use std::ops::{Deref, DerefMut};

#[derive(Clone, Debug, Default)]
pub struct DirtyTracker<T> {
    value: T,
    dirty: bool,
}

/// Smart pointer that marks the value as dirty when dereferenced mutably
pub struct DirtyOnDerefMut<'a, T> {
    value: &'a mut T,
    dirty: &'a mut bool,
}

impl<T> Deref for DirtyOnDerefMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value
    }
}

impl<T> DerefMut for DirtyOnDerefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        *self.dirty = true;
        self.value
    }
}

impl<T> DirtyTracker<T> {
    /// Wraps a value that is already in sync with its backing storage.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> DirtyOnDerefMut<'_, T> {
        DirtyOnDerefMut {
            value: &mut self.value,
            dirty: &mut self.dirty,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_access_stays_clean() {
        let mut tracker = DirtyTracker::clean(vec![1, 2]);
        let guard = tracker.value_mut();
        assert_eq!(guard.len(), 2);
        drop(guard);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_mutation_marks_dirty_once() {
        let mut tracker = DirtyTracker::clean(vec![1]);
        tracker.value_mut().push(2);
        assert!(tracker.take_dirty());
        assert!(!tracker.take_dirty());
        assert_eq!(tracker.value(), &vec![1, 2]);
    }
}
