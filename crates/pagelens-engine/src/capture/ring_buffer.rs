//! Fixed-capacity FIFO buffer.

use std::collections::VecDeque;

/// Appends at the back and evicts from the front once full.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning the evicted entry if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
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

    /// Copy of the contents, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut buffer = RingBuffer::new(3);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut buffer = RingBuffer::new(3);
        for i in 0..5 {
            buffer.push(i);
            assert!(buffer.len() <= buffer.capacity());
        }
        assert_eq!(buffer.to_vec(), vec![2, 3, 4]);
        assert_eq!(buffer.push(5), Some(2));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut buffer = RingBuffer::new(0);
        assert_eq!(buffer.push("x"), Some("x"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = RingBuffer::new(2);
        buffer.push(1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
    }
}
