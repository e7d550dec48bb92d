//! Error taxonomy for the synchronization core.
//!
//! The split mirrors how failures are handled at the tick loop:
//! - invariant violations ([`BindingError`]) are rejected and surfaced to the
//!   caller without corrupting existing state;
//! - transient simulation faults ([`WorldError`]) cost one tick's physics
//!   advance and are retried on the next tick;
//! - spawn failures ([`SpawnError`]) roll back whatever half of the pair was
//!   already created, so no orphaned body or node survives them.

use thiserror::Error;

/// Violations of the one-to-one body/visual pairing invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("visual node {0} is already bound to a body")]
    NodeAlreadyBound(u32),
    #[error("body is already bound to a visual node")]
    BodyAlreadyBound,
}

/// Failures from the visual scene collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene node capacity ({0}) exhausted")]
    CapacityExhausted(usize),
    #[error("parent node {0} does not exist")]
    MissingParent(u32),
}

/// Transient faults from the rigid-body world. Never fatal: the tick that
/// observes one is aborted and the next tick proceeds normally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("refusing to step: a dynamic body has a non-finite pose")]
    NonFinitePose,
}

/// Failures while creating a paired (body, visual) sphere.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("visual node creation failed: {0}")]
    Scene(#[from] SceneError),
    #[error("binding rejected: {0}")]
    Binding(#[from] BindingError),
}

/// Fatal startup failures. Reported once; everything after construction
/// degrades instead of terminating.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to build static scene: {0}")]
    Scene(#[from] SceneError),
}
