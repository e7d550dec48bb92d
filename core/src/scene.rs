/*!
Minimal scene graph consumed by the synchronization core.

The core never renders; it only needs a place to hang visual nodes so their
transforms can be copied to and from physics bodies each tick. A renderer
(the `whirl-client` Bevy shell, or anything else) mirrors these nodes into
its own representation.

Parenting exists because the propeller blade sits at a local offset inside a
rotating container node: the kinematic copy must read the blade's *world*
pose, not its local one.
*/

use std::collections::HashMap;

use crate::error::SceneError;
use crate::types::{Pose, Quat, Vec3};

/// Stable identifier for a scene node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a node represents, so a renderer can pick geometry/materials for it.
/// Purely presentational; the core never branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Rotation-authority container for the driver parts.
    Container,
    /// The propeller blade.
    Blade,
    /// The central hub cylinder.
    Hub,
    /// One segment of the ring enclosure.
    RingSegment,
    Floor,
    Ceiling,
    /// A dynamic sphere.
    Sphere,
}

/// A single scene node: a local pose plus an optional parent.
#[derive(Clone, Copy, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    pub fn at(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[inline]
    pub fn local_pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation)
    }
}

/// Node storage with stable ids and world-pose composition.
///
/// An optional capacity bound makes insertion fallible; the spawner relies on
/// that error path to prove its rollback behavior.
#[derive(Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    next_id: u32,
    capacity: Option<usize>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of live nodes. Exceeding it fails `insert`.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Change or clear the capacity bound on a live graph.
    pub fn set_capacity_limit(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }

    /// Add a node. Fails if the capacity bound is hit or the parent is gone.
    pub fn insert(&mut self, node: Node) -> Result<NodeId, SceneError> {
        if let Some(cap) = self.capacity {
            if self.nodes.len() >= cap {
                return Err(SceneError::CapacityExhausted(cap));
            }
        }
        if let Some(parent) = node.parent {
            if !self.nodes.contains_key(&parent) {
                return Err(SceneError::MissingParent(parent.0));
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Detach and return a node. Callers must not remove a node that still
    /// has live children; the core only ever removes leaf (sphere) nodes.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        debug_assert!(
            !self.nodes.values().any(|n| n.parent == Some(id)),
            "removing a scene node that still has children"
        );
        self.nodes.remove(&id)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.translation = translation;
        }
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rotation = rotation;
        }
    }

    pub fn set_pose(&mut self, id: NodeId, pose: Pose) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.translation = pose.translation;
            node.rotation = pose.rotation;
        }
    }

    /// World pose of a node, composing the parent chain root-down.
    pub fn world_pose(&self, id: NodeId) -> Option<Pose> {
        let node = self.nodes.get(&id)?;
        let local = node.local_pose();
        match node.parent {
            None => Some(local),
            Some(parent) => {
                let parent_pose = self.world_pose(parent)?;
                Some(parent_pose.transform(&local))
            }
        }
    }

    /// Iterate over `(id, node)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_pose_composes_parent_rotation() {
        let mut scene = SceneGraph::new();
        let container = scene.insert(Node::new(NodeKind::Container)).unwrap();
        let blade = scene
            .insert(Node::new(NodeKind::Blade).at(Vec3::new(1.45, 0.0, 0.0)).child_of(container))
            .unwrap();

        // Half a turn about +Y flips the blade to the other side.
        scene.set_rotation(
            container,
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::PI),
        );

        let world = scene.world_pose(blade).unwrap();
        assert_relative_eq!(world.translation.x, -1.45, epsilon = 1e-5);
        assert_relative_eq!(world.translation.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn insert_rejects_missing_parent() {
        let mut scene = SceneGraph::new();
        let err = scene
            .insert(Node::new(NodeKind::Sphere).child_of(NodeId(99)))
            .unwrap_err();
        assert_eq!(err, SceneError::MissingParent(99));
    }

    #[test]
    fn capacity_limit_fails_insert_but_keeps_existing_nodes() {
        let mut scene = SceneGraph::with_capacity_limit(1);
        let first = scene.insert(Node::new(NodeKind::Sphere)).unwrap();
        let err = scene.insert(Node::new(NodeKind::Sphere)).unwrap_err();
        assert_eq!(err, SceneError::CapacityExhausted(1));
        assert!(scene.contains(first));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn remove_returns_the_node() {
        let mut scene = SceneGraph::new();
        let id = scene
            .insert(Node::new(NodeKind::Sphere).at(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        let node = scene.remove(id).unwrap();
        assert_eq!(node.kind, NodeKind::Sphere);
        assert!(!scene.contains(id));
        assert!(scene.remove(id).is_none());
    }
}
