//! Insertion-ordered owner of every live key/value pair.
//!
//! Elements live in a [`SlotMap`] arena so that the bucket table can refer to
//! them through small [`ElementKey`]s which stay valid until that element is
//! removed. An intrusive doubly linked list threaded through the arena keeps
//! insertion order independent of slot reuse.

use core::ops::Index;
use core::ops::IndexMut;

use slotmap::SecondaryMap;
use slotmap::SlotMap;
use slotmap::new_key_type;

new_key_type! {
    /// Stable reference to an element in the [`ElementStore`].
    ///
    /// The default value is the null key, used by empty bucket slots.
    pub(crate) struct ElementKey;
}

pub(crate) struct Element<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Output of the map's hasher, computed once on insert.
    pub(crate) hash: u64,
    /// Ideal bucket under the table's current capacity.
    pub(crate) bucket: usize,
    prev: Option<ElementKey>,
    next: Option<ElementKey>,
}

pub(crate) struct ElementStore<K, V> {
    nodes: SlotMap<ElementKey, Element<K, V>>,
    head: Option<ElementKey>,
    tail: Option<ElementKey>,
}

impl<K, V> Default for ElementStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ElementStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends an element after every existing one and returns its key.
    pub(crate) fn push_back(&mut self, key: K, value: V, hash: u64, bucket: usize) -> ElementKey {
        let prev = self.tail;
        let element = self.nodes.insert(Element {
            key,
            value,
            hash,
            bucket,
            prev,
            next: None,
        });

        match prev {
            Some(tail) => self.nodes[tail].next = Some(element),
            None => self.head = Some(element),
        }
        self.tail = Some(element);

        element
    }

    /// Unlinks and returns the element behind `element`.
    ///
    /// Only `element` is invalidated; every other key stays valid.
    pub(crate) fn remove(&mut self, element: ElementKey) -> Option<(K, V)> {
        let removed = self.nodes.remove(element)?;

        match removed.prev {
            Some(prev) => self.nodes[prev].next = removed.next,
            None => self.head = removed.next,
        }
        match removed.next {
            Some(next) => self.nodes[next].prev = removed.prev,
            None => self.tail = removed.prev,
        }

        Some((removed.key, removed.value))
    }

    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        let head = self.head?;
        self.remove(head)
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<ElementKey> {
        self.head
    }

    #[inline]
    pub(crate) fn next_of(&self, element: ElementKey) -> Option<ElementKey> {
        self.nodes.get(element).and_then(|e| e.next)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.nodes.len(),
        }
    }

    /// Mutable iteration in insertion order.
    ///
    /// The arena hands out all of its mutable references at once; they are
    /// parked in a secondary map and released following the order list.
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.nodes.len();
        let cursor = self.head;
        IterMut {
            elements: self.nodes.iter_mut().collect(),
            cursor,
            remaining,
        }
    }
}

impl<K, V> Index<ElementKey> for ElementStore<K, V> {
    type Output = Element<K, V>;

    #[inline]
    fn index(&self, element: ElementKey) -> &Self::Output {
        &self.nodes[element]
    }
}

impl<K, V> IndexMut<ElementKey> for ElementStore<K, V> {
    #[inline]
    fn index_mut(&mut self, element: ElementKey) -> &mut Self::Output {
        &mut self.nodes[element]
    }
}

pub(crate) struct Iter<'a, K, V> {
    nodes: &'a SlotMap<ElementKey, Element<K, V>>,
    cursor: Option<ElementKey>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Element<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let element = &nodes[self.cursor?];
        self.cursor = element.next;
        self.remaining -= 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

pub(crate) struct IterMut<'a, K, V> {
    elements: SecondaryMap<ElementKey, &'a mut Element<K, V>>,
    cursor: Option<ElementKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = &'a mut Element<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.elements.remove(self.cursor?)?;
        self.cursor = element.next;
        self.remaining -= 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
