//! Growable storage with an explicit capacity and a doubling growth policy.
//!
//! The line editor, the tokenizer and the working directory all keep their
//! contents in a [`GrowBuffer`]. Capacity is tracked separately from the backing
//! `Vec` so the growth steps are observable and deterministic: whenever a push
//! would reach past the current capacity, the capacity doubles.

use log::trace;
use thiserror::Error;

/// Storage could not be grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot grow buffer to {requested} elements")]
pub struct GrowError {
    /// Capacity that was requested when the allocation failed.
    pub requested: usize,
}

#[derive(Debug, Clone)]
pub struct GrowBuffer<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> GrowBuffer<T> {
    /// Create an empty buffer able to hold `capacity` elements before growing.
    ///
    /// A zero capacity is bumped to one so that doubling always makes progress.
    pub fn with_capacity(capacity: usize) -> Result<Self, GrowError> {
        let capacity = capacity.max(1);
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|_| GrowError { requested: capacity })?;
        Ok(Self { items, capacity })
    }

    /// Append one element, doubling the capacity first if the buffer is full.
    pub fn push(&mut self, item: T) -> Result<(), GrowError> {
        self.ensure_capacity(self.items.len() + 1)?;
        self.items.push(item);
        Ok(())
    }

    /// Remove the most recently appended element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Make room for at least `needed` elements, doubling as many times as required.
    pub fn ensure_capacity(&mut self, needed: usize) -> Result<(), GrowError> {
        if needed <= self.capacity {
            return Ok(());
        }
        let mut target = self.capacity;
        while target < needed {
            target = target
                .checked_mul(2)
                .ok_or(GrowError { requested: usize::MAX })?;
        }
        self.items
            .try_reserve_exact(target - self.items.len())
            .map_err(|_| GrowError { requested: target })?;
        trace!("buffer grown from {} to {} elements", self.capacity, target);
        self.capacity = target;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Drop the contents, keeping the current capacity.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> GrowBuffer<T> {
    /// Append every element of `items`, growing as needed.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), GrowError> {
        self.ensure_capacity(self.items.len() + items.len())?;
        self.items.extend_from_slice(items);
        Ok(())
    }
}
