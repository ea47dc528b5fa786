//! Arena-backed doubly linked lists.
//!
//! Nodes live in a [`NodeArena`] (a slab with a free list) and are linked by
//! [`NodeId`] handles instead of pointers. A [`LinkedList`] is only a header
//! (`first`, `last`, `len`) over an arena, so several lists can share one
//! arena and a node can be spliced from one list into another in O(1). The
//! LFU cache relies on this: every frequency bucket is a header over the same
//! node arena.
//!
//! ```text
//!   arena (NodeArena<T>)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ NodeId │ Node { value, prev, next }                   │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ 0      │ { value: A, prev: None,    next: Some(2) }   │
//!   │ 1      │ <free>                                       │
//!   │ 2      │ { value: B, prev: Some(0), next: None }      │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   first ─► [0] ◄──► [2] ◄── last
//! ```
//!
//! [`List`] bundles an arena with a single header for callers that only need
//! one ordering (FIFO and LRU).

/// Handle to a node stored in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Slab of list nodes addressed by [`NodeId`].
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores an unlinked node and returns its handle.
    pub(crate) fn insert(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.len += 1;
        NodeId(idx)
    }

    /// Frees a node. The caller must have detached it from its list first.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered sequence of arena nodes.
///
/// Invariants: `len` equals the number of nodes reachable from `first` to
/// `last`, the first node has no `prev`, the last node has no `next`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinkedList {
    first: Option<NodeId>,
    last: Option<NodeId>,
    len: usize,
}

impl LinkedList {
    pub(crate) const fn new() -> Self {
        Self {
            first: None,
            last: None,
            len: 0,
        }
    }

    pub(crate) fn first(&self) -> Option<NodeId> {
        self.first
    }

    #[cfg(test)]
    pub(crate) fn last(&self) -> Option<NodeId> {
        self.last
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Links a detached node in as the new first element.
    pub(crate) fn attach_first<T>(&mut self, arena: &mut NodeArena<T>, id: NodeId) {
        let old_first = self.first;
        if let Some(node) = arena.node_mut(id) {
            node.prev = None;
            node.next = old_first;
        } else {
            return;
        }
        match old_first.and_then(|first| arena.node_mut(first)) {
            Some(first) => first.prev = Some(id),
            None => self.last = Some(id),
        }
        self.first = Some(id);
        self.len += 1;
    }

    /// Links a detached node in as the new last element.
    pub(crate) fn attach_last<T>(&mut self, arena: &mut NodeArena<T>, id: NodeId) {
        let old_last = self.last;
        if let Some(node) = arena.node_mut(id) {
            node.next = None;
            node.prev = old_last;
        } else {
            return;
        }
        match old_last.and_then(|last| arena.node_mut(last)) {
            Some(last) => last.next = Some(id),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        self.len += 1;
    }

    /// Links a detached node in directly after `anchor`, which must already
    /// belong to this list.
    pub(crate) fn attach_after<T>(&mut self, arena: &mut NodeArena<T>, anchor: NodeId, id: NodeId) {
        let next = match arena.node(anchor) {
            Some(node) => node.next,
            None => return,
        };
        if let Some(node) = arena.node_mut(id) {
            node.prev = Some(anchor);
            node.next = next;
        } else {
            return;
        }
        if let Some(anchor_node) = arena.node_mut(anchor) {
            anchor_node.next = Some(id);
        }
        match next.and_then(|next| arena.node_mut(next)) {
            Some(next_node) => next_node.prev = Some(id),
            None => self.last = Some(id),
        }
        self.len += 1;
    }

    /// Unlinks `id` from this list without freeing it.
    ///
    /// The node must belong to this list; handles from another list corrupt
    /// both headers.
    pub(crate) fn detach<T>(&mut self, arena: &mut NodeArena<T>, id: NodeId) -> bool {
        let (prev, next) = match arena.node(id) {
            Some(node) => (node.prev, node.next),
            None => return false,
        };

        match prev.and_then(|prev| arena.node_mut(prev)) {
            Some(prev_node) => prev_node.next = next,
            None => self.first = next,
        }
        match next.and_then(|next| arena.node_mut(next)) {
            Some(next_node) => next_node.prev = prev,
            None => self.last = prev,
        }
        if let Some(node) = arena.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
        self.len -= 1;
        true
    }

    /// Unlinks and returns the first node without freeing it.
    pub(crate) fn detach_first<T>(&mut self, arena: &mut NodeArena<T>) -> Option<NodeId> {
        let id = self.first?;
        self.detach(arena, id);
        Some(id)
    }

    /// Unlinks and returns the last node without freeing it.
    pub(crate) fn detach_last<T>(&mut self, arena: &mut NodeArena<T>) -> Option<NodeId> {
        let id = self.last?;
        self.detach(arena, id);
        Some(id)
    }

    pub(crate) fn move_to_first<T>(&mut self, arena: &mut NodeArena<T>, id: NodeId) {
        if self.first == Some(id) {
            return;
        }
        if self.detach(arena, id) {
            self.attach_first(arena, id);
        }
    }

    #[cfg(test)]
    pub(crate) fn move_to_last<T>(&mut self, arena: &mut NodeArena<T>, id: NodeId) {
        if self.last == Some(id) {
            return;
        }
        if self.detach(arena, id) {
            self.attach_last(arena, id);
        }
    }

    /// Forgets every node. The arena slots are not freed.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Iterates node handles from first to last.
    pub(crate) fn ids<'a, T>(&self, arena: &'a NodeArena<T>) -> Ids<'a, T> {
        Ids {
            arena,
            current: self.first,
        }
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants<T>(&self, arena: &NodeArena<T>) {
        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.first;
        while let Some(id) = current {
            let node = arena.node(id).expect("linked node missing from arena");
            assert_eq!(node.prev, prev, "prev link out of sync");
            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len, "list longer than its recorded length");
        }
        assert_eq!(prev, self.last, "last does not terminate the chain");
        assert_eq!(count, self.len);
    }
}

/// Iterator over node handles of one list.
#[derive(Debug)]
pub(crate) struct Ids<'a, T> {
    arena: &'a NodeArena<T>,
    current: Option<NodeId>,
}

impl<T> Iterator for Ids<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.arena.node(id).and_then(|node| node.next);
        Some(id)
    }
}

/// A single list that owns its nodes.
#[derive(Debug)]
pub(crate) struct List<T> {
    arena: NodeArena<T>,
    links: LinkedList,
}

impl<T> List<T> {
    pub(crate) fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            links: LinkedList::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            links: LinkedList::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub(crate) fn push_first(&mut self, value: T) -> NodeId {
        let id = self.arena.insert(value);
        self.links.attach_first(&mut self.arena, id);
        id
    }

    pub(crate) fn push_last(&mut self, value: T) -> NodeId {
        let id = self.arena.insert(value);
        self.links.attach_last(&mut self.arena, id);
        id
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        if !self.links.detach(&mut self.arena, id) {
            return None;
        }
        self.arena.remove(id)
    }

    pub(crate) fn remove_first(&mut self) -> Option<T> {
        let id = self.links.detach_first(&mut self.arena)?;
        self.arena.remove(id)
    }

    pub(crate) fn remove_last(&mut self) -> Option<T> {
        let id = self.links.detach_last(&mut self.arena)?;
        self.arena.remove(id)
    }

    pub(crate) fn move_to_first(&mut self, id: NodeId) {
        self.links.move_to_first(&mut self.arena, id);
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id)
    }

    #[cfg(test)]
    pub(crate) fn first(&self) -> Option<&T> {
        self.links.first().and_then(|id| self.arena.get(id))
    }

    #[cfg(test)]
    pub(crate) fn last(&self) -> Option<&T> {
        self.links.last().and_then(|id| self.arena.get(id))
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.links.reset();
    }

    /// Iterates values from first to last.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.links
            .ids(&self.arena)
            .filter_map(move |id| self.arena.get(id))
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        self.links.debug_validate_invariants(&self.arena);
        assert_eq!(self.arena.len(), self.links.len());
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}
