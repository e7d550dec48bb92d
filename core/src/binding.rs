/*!
The body–visual binding table.

Single source of truth for which scene node corresponds to which rigid body
for all dynamic spheres. Entries keep insertion order, which makes the
per-tick transform copy deterministic and testable.

Invariants
- One-to-one: a node or a body appears in at most one entry. `insert`
  rejects a duplicate on either side without touching existing entries.
- The table holds non-owning references. Callers removing an entry must
  also remove the body from the world and the node from the scene within
  the same tick.

Removal during a forward scan is a known hazard (skipping the element after
the removed one); callers therefore collect a snapshot first and remove
afterwards. See [`BindingTable::snapshot`].
*/

use rapier3d::prelude::RigidBodyHandle;

use crate::error::BindingError;
use crate::scene::NodeId;

/// One paired (visual node, rigid body) entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundPair {
    pub node: NodeId,
    pub body: RigidBodyHandle,
}

/// Live pairs, in insertion order.
#[derive(Default)]
pub struct BindingTable {
    entries: Vec<BoundPair>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. Fails if either reference is already bound.
    pub fn insert(&mut self, node: NodeId, body: RigidBodyHandle) -> Result<(), BindingError> {
        if self.entries.iter().any(|p| p.node == node) {
            return Err(BindingError::NodeAlreadyBound(node.0));
        }
        if self.entries.iter().any(|p| p.body == body) {
            return Err(BindingError::BodyAlreadyBound);
        }
        self.entries.push(BoundPair { node, body });
        Ok(())
    }

    /// Detach and return the pair bound to `body`. The caller owns the rest
    /// of the teardown (world removal, scene removal).
    pub fn remove_by_body(&mut self, body: RigidBodyHandle) -> Option<BoundPair> {
        let idx = self.entries.iter().position(|p| p.body == body)?;
        Some(self.entries.remove(idx))
    }

    /// Detach and return the pair bound to `node`.
    pub fn remove_by_node(&mut self, node: NodeId) -> Option<BoundPair> {
        let idx = self.entries.iter().position(|p| p.node == node)?;
        Some(self.entries.remove(idx))
    }

    pub fn node_for(&self, body: RigidBodyHandle) -> Option<NodeId> {
        self.entries.iter().find(|p| p.body == body).map(|p| p.node)
    }

    pub fn body_for(&self, node: NodeId) -> Option<RigidBodyHandle> {
        self.entries.iter().find(|p| p.node == node).map(|p| p.body)
    }

    /// Iterate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = BoundPair> + '_ {
        self.entries.iter().copied()
    }

    /// Copy of the current pairs, safe to walk while mutating the table.
    pub fn snapshot(&self) -> Vec<BoundPair> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::prelude::{RigidBodyBuilder, RigidBodySet};

    fn handles(n: usize) -> Vec<RigidBodyHandle> {
        let mut set = RigidBodySet::new();
        (0..n)
            .map(|_| set.insert(RigidBodyBuilder::dynamic().build()))
            .collect()
    }

    #[test]
    fn insert_preserves_order_and_rejects_duplicates() {
        let bodies = handles(3);
        let mut table = BindingTable::new();
        for (i, &body) in bodies.iter().enumerate() {
            table.insert(NodeId(i as u32), body).unwrap();
        }

        // Duplicate node, fresh body.
        let extra = handles(1)[0];
        assert_eq!(
            table.insert(NodeId(0), extra),
            Err(BindingError::NodeAlreadyBound(0))
        );
        // Fresh node, duplicate body.
        assert_eq!(
            table.insert(NodeId(9), bodies[1]),
            Err(BindingError::BodyAlreadyBound)
        );

        // Rejections left the table intact and ordered.
        let order: Vec<u32> = table.iter().map(|p| p.node.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn remove_by_body_detaches_exactly_one_pair() {
        let bodies = handles(3);
        let mut table = BindingTable::new();
        for (i, &body) in bodies.iter().enumerate() {
            table.insert(NodeId(i as u32), body).unwrap();
        }

        let pair = table.remove_by_body(bodies[1]).unwrap();
        assert_eq!(pair.node, NodeId(1));
        assert_eq!(table.len(), 2);
        assert!(table.remove_by_body(bodies[1]).is_none());
        assert_eq!(table.node_for(bodies[2]), Some(NodeId(2)));
    }

    #[test]
    fn snapshot_is_stable_under_removal() {
        let bodies = handles(4);
        let mut table = BindingTable::new();
        for (i, &body) in bodies.iter().enumerate() {
            table.insert(NodeId(i as u32), body).unwrap();
        }

        // Removing while walking the snapshot visits every original entry,
        // which an in-place forward scan would not.
        let mut visited = 0;
        for pair in table.snapshot() {
            visited += 1;
            table.remove_by_body(pair.body);
        }
        assert_eq!(visited, 4);
        assert!(table.is_empty());
    }
}
