//! Array-backed binary heap ordered by a caller-supplied predicate.

use crate::error::{Error, Result};

/// Binary heap where `comparator(a, b) == true` means `a` belongs above `b`.
///
/// With a `<` predicate this is a min-heap. Children of index `i` live at
/// `2i + 1` and `2i + 2`.
pub struct PriorityHeap<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    data: Vec<T>,
    comparator: F,
}

impl<T, F> PriorityHeap<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    pub fn new(comparator: F) -> Self {
        PriorityHeap {
            data: Vec::new(),
            comparator,
        }
    }

    /// Heapifies `items` in place in O(n), sifting down from the last parent.
    pub fn build(items: Vec<T>, comparator: F) -> Self {
        let mut heap = PriorityHeap {
            data: items,
            comparator,
        };
        let n = heap.data.len();
        for i in (0..n / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
        self.sift_up(self.data.len() - 1);
    }

    pub fn pop(&mut self) -> Result<T> {
        if self.data.is_empty() {
            return Err(Error::EmptyHeap);
        }
        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let top = self.data.pop().ok_or(Error::EmptyHeap)?;
        self.sift_down(0);
        Ok(top)
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the heap, returning the backing array in heap order.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !(self.comparator)(&self.data[i], &self.data[parent]) {
                return;
            }
            self.data.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.data.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                return;
            }
            let right = left + 1;
            let mut child = left;
            if right < n && (self.comparator)(&self.data[right], &self.data[left]) {
                child = right;
            }
            if !(self.comparator)(&self.data[child], &self.data[i]) {
                return;
            }
            self.data.swap(i, child);
            i = child;
        }
    }
}
