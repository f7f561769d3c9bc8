//! Threaded AVL tree over arena node indices
//!
//! A balanced ordered index used by the request pool. Nodes live in a
//! flat arena and refer to each other by index, so removal never leaves
//! a dangling reference. On top of the usual left/right structure every
//! node carries explicit in-order predecessor/successor links (the
//! "thread"), which makes ordered walks and successor queries plain
//! pointer chasing instead of recursion. Rotations only touch the
//! left/right structure; in-order position is invariant under rotation,
//! so the thread never needs rebalancing.

use std::cmp::Ordering;

pub(crate) type NodeId = u32;

/// Sentinel for "no node"
pub(crate) const NIL: NodeId = u32::MAX;

#[derive(Debug)]
struct Node<K> {
    key: K,
    slot: u32,
    left: NodeId,
    right: NodeId,
    /// In-order predecessor
    prev: NodeId,
    /// In-order successor
    next: NodeId,
    height: u8,
}

/// Balanced ordered index from keys to arena slot numbers
#[derive(Debug)]
pub(crate) struct Tavl<K> {
    nodes: Vec<Node<K>>,
    free: Vec<NodeId>,
    root: NodeId,
    /// Node holding the smallest key
    first: NodeId,
    /// Node holding the largest key
    last: NodeId,
    len: usize,
}

impl<K: Ord + Copy> Tavl<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: NIL,
            first: NIL,
            last: NIL,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Node holding the smallest key, or `NIL` when empty
    pub(crate) fn first(&self) -> NodeId {
        self.first
    }

    /// In-order successor of `id`, or `NIL` past the largest key
    pub(crate) fn next(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].next
    }

    pub(crate) fn slot_of(&self, id: NodeId) -> u32 {
        self.nodes[id as usize].slot
    }

    /// Exact lookup
    pub(crate) fn get(&self, key: &K) -> Option<u32> {
        let mut node = self.root;
        while node != NIL {
            let n = &self.nodes[node as usize];
            match key.cmp(&n.key) {
                Ordering::Equal => return Some(n.slot),
                Ordering::Less => node = n.left,
                Ordering::Greater => node = n.right,
            }
        }
        None
    }

    /// First node whose key is `>= key`, or `NIL` when every key is smaller
    pub(crate) fn lower_bound(&self, key: &K) -> NodeId {
        let mut node = self.root;
        let mut best = NIL;
        while node != NIL {
            let n = &self.nodes[node as usize];
            if n.key >= *key {
                best = node;
                node = n.left;
            } else {
                node = n.right;
            }
        }
        best
    }

    /// Insert a key that is not already present
    pub(crate) fn insert(&mut self, key: K, slot: u32) {
        debug_assert!(self.get(&key).is_none());
        let new = self.alloc(key, slot);
        if self.root == NIL {
            self.root = new;
            self.first = new;
            self.last = new;
        } else {
            let root = self.root;
            self.root = self.insert_at(root, new);
        }
        self.len += 1;
    }

    /// Remove a key, returning the slot it mapped to
    pub(crate) fn remove(&mut self, key: &K) -> Option<u32> {
        // Confirm presence up front so a miss leaves the tree untouched.
        self.get(key)?;
        let root = self.root;
        let (new_root, removed) = self.remove_at(root, *key);
        self.root = new_root;
        self.len -= 1;
        removed
    }

    fn alloc(&mut self, key: K, slot: u32) -> NodeId {
        let node = Node {
            key,
            slot,
            left: NIL,
            right: NIL,
            prev: NIL,
            next: NIL,
            height: 1,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = node;
                id
            }
            None => {
                self.nodes.push(node);
                (self.nodes.len() - 1) as NodeId
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.free.push(id);
    }

    /// Splice `new` into the thread just before `target`
    fn link_before(&mut self, new: NodeId, target: NodeId) {
        let prev = self.nodes[target as usize].prev;
        self.nodes[new as usize].prev = prev;
        self.nodes[new as usize].next = target;
        self.nodes[target as usize].prev = new;
        if prev == NIL {
            self.first = new;
        } else {
            self.nodes[prev as usize].next = new;
        }
    }

    /// Splice `new` into the thread just after `target`
    fn link_after(&mut self, new: NodeId, target: NodeId) {
        let next = self.nodes[target as usize].next;
        self.nodes[new as usize].next = next;
        self.nodes[new as usize].prev = target;
        self.nodes[target as usize].next = new;
        if next == NIL {
            self.last = new;
        } else {
            self.nodes[next as usize].prev = new;
        }
    }

    /// Remove `id` from the thread
    fn unlink(&mut self, id: NodeId) {
        let prev = self.nodes[id as usize].prev;
        let next = self.nodes[id as usize].next;
        if prev == NIL {
            self.first = next;
        } else {
            self.nodes[prev as usize].next = next;
        }
        if next == NIL {
            self.last = prev;
        } else {
            self.nodes[next as usize].prev = prev;
        }
        self.nodes[id as usize].prev = NIL;
        self.nodes[id as usize].next = NIL;
    }

    fn height(&self, id: NodeId) -> u8 {
        if id == NIL {
            0
        } else {
            self.nodes[id as usize].height
        }
    }

    fn update_height(&mut self, id: NodeId) {
        let h = 1 + self
            .height(self.nodes[id as usize].left)
            .max(self.height(self.nodes[id as usize].right));
        self.nodes[id as usize].height = h;
    }

    fn balance(&self, id: NodeId) -> i16 {
        self.height(self.nodes[id as usize].left) as i16
            - self.height(self.nodes[id as usize].right) as i16
    }

    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let l = self.nodes[id as usize].left;
        self.nodes[id as usize].left = self.nodes[l as usize].right;
        self.nodes[l as usize].right = id;
        self.update_height(id);
        self.update_height(l);
        l
    }

    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let r = self.nodes[id as usize].right;
        self.nodes[id as usize].right = self.nodes[r as usize].left;
        self.nodes[r as usize].left = id;
        self.update_height(id);
        self.update_height(r);
        r
    }

    /// Restore the AVL invariant at `id`, returning the new subtree root
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let bal = self.balance(id);
        if bal > 1 {
            let l = self.nodes[id as usize].left;
            if self.height(self.nodes[l as usize].left) >= self.height(self.nodes[l as usize].right)
            {
                self.rotate_right(id)
            } else {
                let nl = self.rotate_left(l);
                self.nodes[id as usize].left = nl;
                self.rotate_right(id)
            }
        } else if bal < -1 {
            let r = self.nodes[id as usize].right;
            if self.height(self.nodes[r as usize].right)
                >= self.height(self.nodes[r as usize].left)
            {
                self.rotate_left(id)
            } else {
                let nr = self.rotate_right(r);
                self.nodes[id as usize].right = nr;
                self.rotate_left(id)
            }
        } else {
            id
        }
    }

    fn insert_at(&mut self, node: NodeId, new: NodeId) -> NodeId {
        if self.nodes[new as usize].key < self.nodes[node as usize].key {
            let left = self.nodes[node as usize].left;
            if left == NIL {
                self.link_before(new, node);
                self.nodes[node as usize].left = new;
            } else {
                let l = self.insert_at(left, new);
                self.nodes[node as usize].left = l;
            }
        } else {
            let right = self.nodes[node as usize].right;
            if right == NIL {
                self.link_after(new, node);
                self.nodes[node as usize].right = new;
            } else {
                let r = self.insert_at(right, new);
                self.nodes[node as usize].right = r;
            }
        }
        self.rebalance(node)
    }

    fn remove_at(&mut self, node: NodeId, key: K) -> (NodeId, Option<u32>) {
        if node == NIL {
            return (NIL, None);
        }
        let removed;
        match key.cmp(&self.nodes[node as usize].key) {
            Ordering::Less => {
                let left = self.nodes[node as usize].left;
                let (l, r) = self.remove_at(left, key);
                self.nodes[node as usize].left = l;
                removed = r;
            }
            Ordering::Greater => {
                let right = self.nodes[node as usize].right;
                let (nr, r) = self.remove_at(right, key);
                self.nodes[node as usize].right = nr;
                removed = r;
            }
            Ordering::Equal => {
                let left = self.nodes[node as usize].left;
                let right = self.nodes[node as usize].right;
                if right == NIL {
                    let slot = self.nodes[node as usize].slot;
                    self.unlink(node);
                    self.release(node);
                    return (left, Some(slot));
                } else if left == NIL {
                    let slot = self.nodes[node as usize].slot;
                    self.unlink(node);
                    self.release(node);
                    return (right, Some(slot));
                } else {
                    // The thread gives the in-order successor directly: the
                    // leftmost node of the right subtree. Swap payloads so
                    // this node takes over the successor's key, then remove
                    // the successor (now holding the doomed key) from the
                    // right subtree. The two nodes are adjacent in order,
                    // so the thread stays sorted after the swap.
                    let succ = self.nodes[node as usize].next;
                    debug_assert_ne!(succ, NIL);
                    let succ_key = self.nodes[succ as usize].key;
                    let succ_slot = self.nodes[succ as usize].slot;
                    let node_slot = self.nodes[node as usize].slot;
                    self.nodes[node as usize].key = succ_key;
                    self.nodes[node as usize].slot = succ_slot;
                    self.nodes[succ as usize].key = key;
                    self.nodes[succ as usize].slot = node_slot;
                    let (nr, r) = self.remove_at(right, key);
                    self.nodes[node as usize].right = nr;
                    removed = r;
                }
            }
        }
        (self.rebalance(node), removed)
    }

    /// Structural self-check: AVL balance, height bookkeeping, search
    /// order, and agreement between the thread and the tree
    #[cfg(test)]
    pub(crate) fn verify(&self) {
        // Thread walk: strictly ascending, every key searchable, full count.
        let mut count = 0;
        let mut prev_key: Option<K> = None;
        let mut node = self.first;
        let mut last_seen = NIL;
        while node != NIL {
            let key = self.nodes[node as usize].key;
            if let Some(p) = prev_key {
                assert!(p < key, "thread out of order");
            }
            assert_eq!(
                self.get(&key),
                Some(self.nodes[node as usize].slot),
                "thread entry not reachable via search"
            );
            prev_key = Some(key);
            last_seen = node;
            node = self.nodes[node as usize].next;
            count += 1;
        }
        assert_eq!(count, self.len, "thread length disagrees with len");
        assert_eq!(last_seen, self.last, "thread tail disagrees with last");

        // Tree walk: heights and balance factors.
        let measured = self.verify_subtree(self.root);
        assert_eq!(measured, count, "tree size disagrees with thread length");
    }

    #[cfg(test)]
    fn verify_subtree(&self, id: NodeId) -> usize {
        if id == NIL {
            return 0;
        }
        let n = &self.nodes[id as usize];
        let lh = self.height(n.left);
        let rh = self.height(n.right);
        assert_eq!(n.height, 1 + lh.max(rh), "stale height");
        let bal = lh as i16 - rh as i16;
        assert!((-1..=1).contains(&bal), "AVL balance violated");
        if n.left != NIL {
            assert!(self.nodes[n.left as usize].key < n.key, "left child order");
        }
        if n.right != NIL {
            assert!(self.nodes[n.right as usize].key > n.key, "right child order");
        }
        self.verify_subtree(n.left) + 1 + self.verify_subtree(n.right)
    }
}
