//! Recency List Module
//!
//! Arena-backed doubly linked list that keeps cache nodes in access order.
//!
//! Nodes live in a slot vector and link to each other by slot index, so the
//! hash index and the list refer to the same node through a stable handle.
//! Freed slots are recycled through a free list.

// == Slot Handle ==
/// Stable handle to a node in a [`RecencyList`].
pub type SlotId = usize;

#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// - Front = most recently used
/// - Back = least recently used
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<SlotId>,
    front: Option<SlotId>,
    back: Option<SlotId>,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            front: None,
            back: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts `item` as the most recently used node and returns its handle.
    pub fn push_front(&mut self, item: T) -> SlotId {
        let node = Node {
            item,
            prev: None,
            next: self.front,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.front {
            Some(old) => self.node_mut(old).prev = Some(id),
            None => self.back = Some(id),
        }
        self.front = Some(id);
        self.len += 1;
        id
    }

    // == Touch ==
    /// Marks a node as recently used (moves it to the front).
    pub fn move_to_front(&mut self, id: SlotId) {
        if self.front == Some(id) || self.slot(id).is_none() {
            return;
        }
        self.unlink(id);
        let old_front = self.front;
        {
            let node = self.node_mut(id);
            node.prev = None;
            node.next = old_front;
        }
        match old_front {
            Some(old) => self.node_mut(old).prev = Some(id),
            None => self.back = Some(id),
        }
        self.front = Some(id);
    }

    // == Remove ==
    /// Removes a node and returns its item.
    ///
    /// Returns None if the handle does not refer to a live node.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.slot(id)?;
        self.unlink(id);
        let node = self.slots[id].take()?;
        self.free.push(id);
        self.len -= 1;
        Some(node.item)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        let back = self.back?;
        self.remove(back)
    }

    // == Peek Oldest ==
    /// Returns the handle of the least recently used node.
    #[cfg(test)]
    pub fn back(&self) -> Option<SlotId> {
        self.back
    }

    /// Returns the handle of the most recently used node.
    #[cfg(test)]
    pub fn front(&self) -> Option<SlotId> {
        self.front
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slot(id).map(|node| &node.item)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .map(|node| &mut node.item)
    }

    /// Iterates items from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.front,
        }
    }

    /// Drops every node and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.front = None;
        self.back = None;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Detaches a live node from its neighbours, leaving its own links stale.
    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = self.node_mut(id);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.front = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.back = prev,
        }
    }

    fn slot(&self, id: SlotId) -> Option<&Node<T>> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    // Links only ever point at live slots; a dead link is a broken list.
    fn node_mut(&mut self, id: SlotId) -> &mut Node<T> {
        match self.slots.get_mut(id).and_then(Option::as_mut) {
            Some(node) => node,
            None => unreachable!("recency list link to vacant slot {id}"),
        }
    }
}

/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.slot(id)?;
        self.cursor = node.next;
        Some((id, &node.item))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().map(|(_, item)| *item).collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<u8> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        let c = list.push_front("c");

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), vec!["c", "b", "a"]);
        assert_eq!(list.back(), Some(a));
        assert_eq!(list.front(), Some(c));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front(a);

        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(list.back().unwrap()), Some(&"b"));
    }

    #[test]
    fn test_move_middle_and_front_nodes() {
        let mut list = RecencyList::new();

        list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        list.move_to_front(c);
        assert_eq!(order(&list), vec!["c", "b", "a"]);

        list.move_to_front(b);
        assert_eq!(order(&list), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_pop_back() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.pop_back(), Some("key1"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_back(), Some("key2"));
        assert_eq!(list.pop_back(), Some("key3"));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        let key2 = list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.remove(key2), Some("key2"));
        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), vec!["key3", "key1"]);

        // Stale handle
        assert_eq!(list.remove(key2), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.remove(a);

        let c = list.push_front("c");
        assert_eq!(c, a);
        assert_eq!(order(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_remove_only_node_resets_ends() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.remove(a);

        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        list.push_front("b");
        assert_eq!(order(&list), vec!["b"]);
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut list = RecencyList::new();

        let a = list.push_front(1);
        *list.get_mut(a).unwrap() += 10;
        assert_eq!(list.get(a), Some(&11));

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.get(a), None);
        assert_eq!(list.iter().count(), 0);
    }
}
