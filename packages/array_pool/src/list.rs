//! Intrusive doubly-linked lists threaded through the tracking-node arena.

/// Which of the two tracker lists a node currently belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Membership {
    Free,
    Active,
}

/// Tracking node for one slot of the caller's array.
///
/// The node at arena index `i` always tracks slot `i`, so the node does not need to store the
/// slot it refers to. Links are indices into the same arena.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    /// Next node towards the tail. Always `None` for the tail.
    next: Option<usize>,

    /// Previous node towards the head. For the head, this is the tail of the list (which is the
    /// head itself in a single-element list). `None` only while the node is detached.
    prev: Option<usize>,

    pub(crate) membership: Membership,
}

impl Node {
    pub(crate) const fn detached(membership: Membership) -> Self {
        Self {
            next: None,
            prev: None,
            membership,
        }
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }
}

fn node(nodes: &[Node], index: usize) -> &Node {
    nodes
        .get(index)
        .expect("list links only ever refer to nodes inside the arena")
}

fn node_mut(nodes: &mut [Node], index: usize) -> &mut Node {
    nodes
        .get_mut(index)
        .expect("list links only ever refer to nodes inside the arena")
}

/// A doubly-linked list of tracking nodes addressed only by its head.
///
/// There is no separate tail field. Instead, the backward link of the head always refers to the
/// tail, which lets both [`append()`][1] and [`delete()`][2] run in constant time without ever
/// walking the list. The list is not circular in the forward direction: the tail has no next.
///
/// The list does not own the nodes. Every operation receives the arena the indices refer to.
///
/// [1]: Self::append
/// [2]: Self::delete
#[derive(Debug, Default)]
pub(crate) struct SlotList {
    head: Option<usize>,
}

impl SlotList {
    pub(crate) const fn new() -> Self {
        Self { head: None }
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The last node of the list, found through the backward link of the head.
    pub(crate) fn tail(&self, nodes: &[Node]) -> Option<usize> {
        self.head.map(|head| {
            node(nodes, head)
                .prev
                .expect("the head of a non-empty list always links back to the tail")
        })
    }

    /// The node after `index` in this list, if any.
    pub(crate) fn next(nodes: &[Node], index: usize) -> Option<usize> {
        node(nodes, index).next
    }

    /// Adds a detached node as the new tail of the list.
    pub(crate) fn append(&mut self, nodes: &mut [Node], index: usize) {
        debug_assert!(
            node(nodes, index).is_detached(),
            "node {index} must be detached before it is appended to a list"
        );

        match self.head {
            None => {
                let added = node_mut(nodes, index);
                added.prev = Some(index);
                added.next = None;

                self.head = Some(index);
            }
            Some(head) => {
                let tail = node(nodes, head)
                    .prev
                    .expect("the head of a non-empty list always links back to the tail");

                let added = node_mut(nodes, index);
                added.prev = Some(tail);
                added.next = None;

                node_mut(nodes, tail).next = Some(index);
                node_mut(nodes, head).prev = Some(index);
            }
        }
    }

    /// Removes a node from wherever it is in the list and leaves it detached.
    ///
    /// The node must be a member of this list. Links of all other nodes stay valid, so a caller
    /// walking the list may continue from a successor it obtained before the removal.
    pub(crate) fn delete(&mut self, nodes: &mut [Node], index: usize) {
        let head = self
            .head
            .expect("cannot delete a node from an empty list");

        let Node { next, prev, .. } = *node(nodes, index);
        let prev = prev.expect("a node that is a member of a list always has a backward link");

        if prev == index {
            // The only node in the list.
            debug_assert_eq!(head, index);
            self.head = None;
        } else if head == index {
            let new_head = next.expect("a head that is not the only node always has a successor");

            // The new head inherits the backward link to the tail.
            node_mut(nodes, new_head).prev = Some(prev);
            self.head = Some(new_head);
        } else {
            node_mut(nodes, prev).next = next;

            match next {
                Some(next) => node_mut(nodes, next).prev = Some(prev),
                // We removed the tail, so the head must now link back to the new tail.
                None => node_mut(nodes, head).prev = Some(prev),
            }
        }

        let removed = node_mut(nodes, index);
        removed.next = None;
        removed.prev = None;
    }

    /// Iterates over the node indices from head to tail.
    pub(crate) fn iter<'a>(&self, nodes: &'a [Node]) -> ListIter<'a> {
        ListIter {
            nodes,
            current: self.head,
        }
    }
}

/// Walks a [`SlotList`] from head to tail.
#[derive(Debug, Clone)]
pub(crate) struct ListIter<'a> {
    nodes: &'a [Node],
    current: Option<usize>,
}

impl Iterator for ListIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = SlotList::next(self.nodes, current);
        Some(current)
    }
}
