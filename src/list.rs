//! CircularList: a circular doubly-linked list over a slot arena.
//!
//! Every node lives in a `SlotMap` and carries its element inline together
//! with `next`/`prev` keys. The ring is closed: a single node links to
//! itself, and the list only remembers its head. Appending inserts just
//! before the head (the tail position), prepending does the same and then
//! moves the head onto the new node.
//!
//! Elements are addressed with `Handle`s. A handle stays valid until its
//! element is removed and never aliases a later element, even when the slot
//! is reused. Handles are tied to the list that issued them; using one with a
//! different list is a logic error.

use crate::alloc::check_slot;
use crate::error::{AllocError, EmptyError};
use core::fmt;
use core::ops::ControlFlow;
use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one element of a `CircularList`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: DefaultKey,
    prev: DefaultKey,
}

pub struct CircularList<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
}

impl<T> CircularList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            head: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Add `elem` at the tail. The head does not move unless the list was empty.
    pub fn append(&mut self, elem: T) -> Result<Handle, AllocError> {
        check_slot(&self.nodes)?;
        let key = match self.head {
            None => {
                let key = self.nodes.insert_with_key(|k| Node {
                    value: elem,
                    next: k,
                    prev: k,
                });
                self.head = Some(key);
                key
            }
            Some(head) => self.link_before(head, elem),
        };
        Ok(Handle(key))
    }

    /// Add `elem` in front of the current head and make it the new head.
    pub fn prepend(&mut self, elem: T) -> Result<Handle, AllocError> {
        let Some(head) = self.head else {
            return self.append(elem);
        };
        check_slot(&self.nodes)?;
        let key = self.link_before(head, elem);
        self.head = Some(key);
        Ok(Handle(key))
    }

    // Insert a node between `at.prev` and `at`.
    fn link_before(&mut self, at: DefaultKey, elem: T) -> DefaultKey {
        let prev = self.nodes[at].prev;
        let key = self.nodes.insert(Node {
            value: elem,
            next: at,
            prev,
        });
        self.nodes[prev].next = key;
        self.nodes[at].prev = key;
        key
    }

    /// Unlink the element behind `h` and hand it back. Stale handles yield `None`.
    pub fn remove(&mut self, h: Handle) -> Option<T> {
        let key = h.0;
        let (next, prev) = {
            let node = self.nodes.get(key)?;
            (node.next, node.prev)
        };

        if next == key && prev == key {
            // Sole node: the ring collapses.
            if self.head == Some(key) {
                self.head = None;
            }
        } else {
            self.nodes[prev].next = next;
            self.nodes[next].prev = prev;
            if self.head == Some(key) {
                self.head = Some(next);
            }
        }

        self.nodes.remove(key).map(|n| n.value)
    }

    pub fn first(&self) -> Result<&T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        Ok(&self.nodes[head].value)
    }

    pub fn last(&self) -> Result<&T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        let tail = self.nodes[head].prev;
        Ok(&self.nodes[tail].value)
    }

    pub fn first_mut(&mut self) -> Result<&mut T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        Ok(&mut self.nodes[head].value)
    }

    pub fn last_mut(&mut self) -> Result<&mut T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        let tail = self.nodes[head].prev;
        Ok(&mut self.nodes[tail].value)
    }

    pub fn first_handle(&self) -> Option<Handle> {
        self.head.map(Handle)
    }

    pub fn last_handle(&self) -> Option<Handle> {
        self.head.map(|head| Handle(self.nodes[head].prev))
    }

    pub fn get(&self, h: Handle) -> Option<&T> {
        self.nodes.get(h.0).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        self.nodes.get_mut(h.0).map(|n| &mut n.value)
    }

    /// The element after `h` in ring order; the tail's successor is the head.
    pub fn next(&self, h: Handle) -> Option<Handle> {
        self.nodes.get(h.0).map(|n| Handle(n.next))
    }

    /// The element before `h` in ring order; the head's predecessor is the tail.
    pub fn prev(&self, h: Handle) -> Option<Handle> {
        self.nodes.get(h.0).map(|n| Handle(n.prev))
    }

    /// Visit elements from head to tail, stopping at the first `Break`.
    ///
    /// Returns that `Break`, or `Continue(())` after a full pass (or on an
    /// empty list). The tail is fixed before the first call.
    pub fn browse<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        let Some(head) = self.head else {
            return ControlFlow::Continue(());
        };
        let end = self.nodes[head].prev;
        let mut cur = head;
        loop {
            let node = &self.nodes[cur];
            f(&node.value)?;
            if cur == end {
                return ControlFlow::Continue(());
            }
            cur = node.next;
        }
    }

    /// Remove every element, head first.
    pub fn clear(&mut self) {
        while let Some(head) = self.head {
            self.remove(Handle(head));
        }
    }

    /// Head-to-tail iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cur: self.head,
            remaining: self.nodes.len(),
        }
    }
}

impl<T> Default for CircularList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over a `CircularList` in ring order, starting at the head.
pub struct Iter<'a, T> {
    list: &'a CircularList<T>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.cur?];
        self.remaining -= 1;
        self.cur = Some(node.next);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a CircularList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
