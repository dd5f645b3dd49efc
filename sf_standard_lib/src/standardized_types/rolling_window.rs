use std::collections::VecDeque;

/// Keeps the most recent `capacity` items, index 0 is the latest.
/// A capacity of 0 retains nothing.
#[derive(Clone, Debug)]
pub struct RollingWindow<T> {
    history: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        RollingWindow {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, data: T) {
        if self.capacity == 0 {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_back();
        }
        self.history.push_front(data);
    }

    pub fn last(&self) -> Option<&T> {
        self.history.front()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.history.get(index)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_full(&self) -> bool {
        self.history.len() == self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Latest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.history.iter()
    }
}
