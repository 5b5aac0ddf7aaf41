// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The versioned transform node and its update protocol.

use kurbo::Affine;

use crate::uid::{Fingerprint, Uid, UidSource};

/// The process-wide identity transform. See [`ComputedTransform::identity`].
static IDENTITY: ComputedTransform = ComputedTransform::identity_node();

/// A world-space affine transform with O(1) change detection.
///
/// Each node owns a composed world matrix, a version counter that bumps by
/// exactly one every time the matrix changes, and a unique [`Uid`]. The
/// `(uid, version)` pair of a node — its [`Fingerprint`] — names one exact
/// state of that node, so remembering the fingerprints of the inputs seen
/// at the last recomputation is enough to decide whether a repeated update
/// would change anything, without touching the inputs' matrices.
///
/// The update methods assume the caller walks the scene graph parents
/// before children within a frame (the parent's fingerprint must be stable
/// for the duration of a child's update). All state is plain data; nodes
/// reachable from more than one traversal must be serialized externally.
///
/// `ComputedTransform` is intentionally not `Clone`: a clone would carry a
/// duplicate `Uid`, and two distinct nodes sharing an identity would
/// silently corrupt every fingerprint comparison involving them.
#[derive(Debug)]
pub struct ComputedTransform {
    matrix: Affine,
    version: u64,
    uid: Uid,
    updated: bool,
    seen_local: Option<Fingerprint>,
    seen_parent: Option<Fingerprint>,
}

impl ComputedTransform {
    const fn identity_node() -> Self {
        Self {
            matrix: Affine::IDENTITY,
            version: 0,
            uid: Uid::IDENTITY,
            updated: false,
            seen_local: None,
            seen_parent: None,
        }
    }

    /// Create a fresh node holding the identity matrix at version 0.
    ///
    /// Both fingerprint slots start empty, so the first update against any
    /// pair of inputs always recomputes. Reusing a node's memory for an
    /// unrelated scene node is the caller's concern and must go through
    /// reconstruction — there is deliberately no `reset`.
    pub fn new(uids: &mut UidSource) -> Self {
        Self {
            matrix: Affine::IDENTITY,
            version: 0,
            uid: uids.mint(),
            updated: false,
            seen_local: None,
            seen_parent: None,
        }
    }

    /// The process-wide identity transform, the implicit root parent.
    ///
    /// Its matrix is [`Affine::IDENTITY`], its identity is
    /// [`Uid::IDENTITY`], and its version is permanently 0: the only
    /// access is through this shared reference, so no update method can
    /// ever be called on it.
    pub fn identity() -> &'static Self {
        &IDENTITY
    }

    /// The composed world matrix as of the last recomputation.
    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    /// Version counter; bumps by exactly one per matrix change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Unique identity of this node.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Fingerprint of this node's current state.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            uid: self.uid,
            version: self.version,
        }
    }

    /// Whether the most recent update call on this node recomputed.
    ///
    /// A side channel for collaborators that already hold the node and
    /// want to skip redundant downstream work this frame without
    /// re-checking fingerprints.
    pub fn updated(&self) -> bool {
        self.updated
    }

    /// Set the matrix directly, returning whether it changed.
    ///
    /// This is the mutation entry point for nodes that act as *local*
    /// inputs to [`update`](Self::update) (a scene node's own transform,
    /// authored by layout or animation). Setting an unchanged value is a
    /// no-op; a changed value bumps the version and marks the node
    /// updated, so dependants see a new fingerprint.
    pub fn set_matrix(&mut self, matrix: Affine) -> bool {
        if self.matrix == matrix {
            return false;
        }
        self.matrix = matrix;
        self.version += 1;
        self.updated = true;
        true
    }

    /// Recompute the world matrix from `parent` and `local`, returning
    /// whether anything changed.
    ///
    /// If both inputs carry the same fingerprints as at the last
    /// recomputation, this is a guaranteed no-op: the matrix and version
    /// are untouched and `false` is returned. Otherwise the node stores
    /// `parent.matrix() * local.matrix()` (local applied first, then the
    /// parent's world transform) and bumps its version.
    ///
    /// `parent` must already be up to date for this frame; that ordering
    /// is the walker's contract and is not verified here.
    pub fn update(&mut self, parent: &Self, local: &Self) -> bool {
        let parent_fp = parent.fingerprint();
        let local_fp = local.fingerprint();
        if self.seen_local == Some(local_fp) && self.seen_parent == Some(parent_fp) {
            self.updated = false;
            return false;
        }

        self.seen_local = Some(local_fp);
        self.seen_parent = Some(parent_fp);
        self.matrix = parent.matrix * local.matrix;
        self.version += 1;
        self.updated = true;
        true
    }

    /// Variant of [`update`](Self::update) for nodes whose local transform
    /// *is* the parent: the parent's matrix is copied verbatim instead of
    /// composed.
    ///
    /// The parent's fingerprint is checked against (and recorded in) both
    /// input slots, so a node driven by `update_single` and one driven by
    /// `update` share the same staleness bookkeeping.
    pub fn update_single(&mut self, parent: &Self) -> bool {
        let parent_fp = parent.fingerprint();
        if self.seen_local == Some(parent_fp) && self.seen_parent == Some(parent_fp) {
            self.updated = false;
            return false;
        }

        self.seen_local = Some(parent_fp);
        self.seen_parent = Some(parent_fp);
        self.matrix = parent.matrix;
        self.version += 1;
        self.updated = true;
        true
    }

    /// Update-or-create a child node composed as `self * local`.
    ///
    /// Creates the child if none is supplied, then runs
    /// [`update`](Self::update) on it with `self` as the parent. The
    /// returned node is owned by the caller; this node retains nothing.
    pub fn update_child(&self, child: Option<Self>, local: &Self, uids: &mut UidSource) -> Self {
        let mut child = child.unwrap_or_else(|| Self::new(uids));
        child.update(self, local);
        child
    }

    /// Update-or-create a child node that copies this node's matrix.
    ///
    /// The `update_single` counterpart of
    /// [`update_child`](Self::update_child).
    pub fn update_single_child(&self, child: Option<Self>, uids: &mut UidSource) -> Self {
        let mut child = child.unwrap_or_else(|| Self::new(uids));
        child.update_single(self);
        child
    }

    /// Update-or-create a child node with the operand roles swapped:
    /// `local` plays the parent and `self` plays the local input.
    ///
    /// This propagates in the inverse direction through a chain, e.g.
    /// projecting a world-space pick ray down into an object's local
    /// space. The child records the swapped roles in its fingerprint
    /// slots, so a node instance should be driven by either the forward
    /// or the reverse entry point, not both: interleaving them is safe
    /// (the swapped slots can never produce a stale match) but recomputes
    /// on every call.
    pub fn update_reverse_child(
        &self,
        child: Option<Self>,
        local: &Self,
        uids: &mut UidSource,
    ) -> Self {
        let mut child = child.unwrap_or_else(|| Self::new(uids));
        child.update(local, self);
        child
    }

    /// Whether a following [`update_reverse_child`](Self::update_reverse_child)
    /// call with the same operands would recompute.
    ///
    /// Pure predicate, no mutation; `None` is always stale. Lets callers
    /// decide whether to invalidate dependants without forcing the
    /// recomputation itself.
    pub fn is_reverse_child_stale(&self, child: Option<&Self>, local: &Self) -> bool {
        let Some(child) = child else {
            return true;
        };
        !(child.seen_local == Some(self.fingerprint())
            && child.seen_parent == Some(local.fingerprint()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    fn local_with(uids: &mut UidSource, matrix: Affine) -> ComputedTransform {
        let mut t = ComputedTransform::new(uids);
        t.set_matrix(matrix);
        t
    }

    #[test]
    fn repeat_update_is_noop() {
        let mut uids = UidSource::new();
        let parent = local_with(&mut uids, Affine::translate(Vec2::new(10.0, 20.0)));
        let local = local_with(&mut uids, Affine::translate(Vec2::new(5.0, 5.0)));
        let mut node = ComputedTransform::new(&mut uids);

        assert!(node.update(&parent, &local), "first update must recompute");
        let matrix = node.matrix();
        let version = node.version();

        assert!(!node.update(&parent, &local), "unchanged inputs must no-op");
        assert!(!node.updated());
        assert_eq!(node.matrix(), matrix, "no-op must not touch the matrix");
        assert_eq!(node.version(), version, "no-op must not bump the version");
    }

    #[test]
    fn version_bumps_once_per_change() {
        let mut uids = UidSource::new();
        let mut local = local_with(&mut uids, Affine::translate(Vec2::new(1.0, 0.0)));
        let mut node = ComputedTransform::new(&mut uids);

        assert_eq!(node.version(), 0, "fresh nodes start at version 0");
        assert!(node.update(ComputedTransform::identity(), &local));
        assert_eq!(node.version(), 1);
        assert!(!node.update(ComputedTransform::identity(), &local));
        assert_eq!(node.version(), 1, "no-op must leave the version alone");

        local.set_matrix(Affine::translate(Vec2::new(2.0, 0.0)));
        assert!(node.update(ComputedTransform::identity(), &local));
        assert_eq!(node.version(), 2);
    }

    #[test]
    fn composes_translations() {
        let mut uids = UidSource::new();
        let parent = local_with(&mut uids, Affine::new([1.0, 0.0, 0.0, 1.0, 10.0, 20.0]));
        let local = local_with(&mut uids, Affine::new([1.0, 0.0, 0.0, 1.0, 5.0, 5.0]));
        let mut node = ComputedTransform::new(&mut uids);

        node.update(&parent, &local);
        assert_eq!(
            node.matrix().as_coeffs(),
            [1.0, 0.0, 0.0, 1.0, 15.0, 25.0],
            "pure translations must add"
        );
    }

    #[test]
    fn composes_rotation_then_translation() {
        let mut uids = UidSource::new();
        // 90 degree rotation, written out exactly to keep the expected
        // coefficients free of floating-point noise.
        let parent = local_with(&mut uids, Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]));
        let local = local_with(&mut uids, Affine::new([1.0, 0.0, 0.0, 1.0, 1.0, 0.0]));
        let mut node = ComputedTransform::new(&mut uids);

        node.update(&parent, &local);
        let [_, _, _, _, tx, ty] = node.matrix().as_coeffs();
        assert_eq!(
            (tx, ty),
            (0.0, 1.0),
            "local translation must be rotated into parent space"
        );
    }

    #[test]
    fn parent_bump_dirties_child() {
        let mut uids = UidSource::new();
        let mut parent = local_with(&mut uids, Affine::translate(Vec2::new(10.0, 0.0)));
        let local = local_with(&mut uids, Affine::translate(Vec2::new(1.0, 0.0)));
        let mut node = ComputedTransform::new(&mut uids);

        assert!(node.update(&parent, &local));
        assert!(!node.update(&parent, &local), "in sync after the first pass");

        parent.set_matrix(Affine::translate(Vec2::new(20.0, 0.0)));
        assert!(
            node.update(&parent, &local),
            "a parent version bump alone must dirty the child"
        );
        assert_eq!(
            node.matrix().as_coeffs(),
            [1.0, 0.0, 0.0, 1.0, 21.0, 0.0]
        );
    }

    #[test]
    fn update_single_copies_and_memoizes() {
        let mut uids = UidSource::new();
        let parent = local_with(&mut uids, Affine::translate(Vec2::new(3.0, 4.0)));
        let mut node = ComputedTransform::new(&mut uids);

        assert!(node.update_single(&parent));
        assert_eq!(node.matrix(), parent.matrix(), "single update copies verbatim");
        assert!(!node.update_single(&parent), "repeat must no-op");
    }

    #[test]
    fn update_child_creates_then_reuses() {
        let mut uids = UidSource::new();
        let mut parent = local_with(&mut uids, Affine::translate(Vec2::new(10.0, 0.0)));
        let local = local_with(&mut uids, Affine::translate(Vec2::new(5.0, 0.0)));

        let child = parent.update_child(None, &local, &mut uids);
        assert!(child.updated(), "a freshly created child must recompute");
        let child_uid = child.uid();

        let child = parent.update_child(Some(child), &local, &mut uids);
        assert_eq!(child.uid(), child_uid, "existing children keep their identity");
        assert!(!child.updated(), "unchanged inputs must no-op through the child path");

        parent.set_matrix(Affine::translate(Vec2::new(11.0, 0.0)));
        let child = parent.update_child(Some(child), &local, &mut uids);
        assert!(child.updated());
        assert_eq!(
            child.matrix().as_coeffs(),
            [1.0, 0.0, 0.0, 1.0, 16.0, 0.0]
        );
    }

    #[test]
    fn reverse_staleness_matches_update() {
        let mut uids = UidSource::new();
        let mut node = local_with(&mut uids, Affine::translate(Vec2::new(1.0, 0.0)));
        let local = local_with(&mut uids, Affine::translate(Vec2::new(2.0, 0.0)));

        assert!(
            node.is_reverse_child_stale(None, &local),
            "a missing child is always stale"
        );

        let child = node.update_reverse_child(None, &local, &mut uids);
        assert!(child.updated());
        assert!(
            !node.is_reverse_child_stale(Some(&child), &local),
            "freshly updated child must be in sync"
        );

        let child = node.update_reverse_child(Some(child), &local, &mut uids);
        assert!(!child.updated(), "predicate said in-sync, so update must no-op");

        node.set_matrix(Affine::translate(Vec2::new(9.0, 0.0)));
        assert!(
            node.is_reverse_child_stale(Some(&child), &local),
            "bumping this node must stale the reverse child"
        );
        let child = node.update_reverse_child(Some(child), &local, &mut uids);
        assert!(child.updated(), "predicate said stale, so update must recompute");
    }

    #[test]
    fn reverse_composition_swaps_roles() {
        let mut uids = UidSource::new();
        // node scales by 2, ancestor translates by (1, 0); the reverse child
        // applies `node` first and then `local`: x -> 2x + 1.
        let node = local_with(&mut uids, Affine::scale(2.0));
        let local = local_with(&mut uids, Affine::translate(Vec2::new(1.0, 0.0)));

        let child = node.update_reverse_child(None, &local, &mut uids);
        assert_eq!(
            child.matrix().as_coeffs(),
            [2.0, 0.0, 0.0, 2.0, 1.0, 0.0]
        );
    }

    #[test]
    fn identity_singleton_is_stable() {
        let mut uids = UidSource::new();
        let identity = ComputedTransform::identity();
        assert_eq!(identity.uid(), Uid::IDENTITY);
        assert_eq!(identity.version(), 0);
        assert_eq!(identity.matrix(), Affine::IDENTITY);

        // Drive plenty of updates elsewhere; the singleton must not move.
        let local = local_with(&mut uids, Affine::translate(Vec2::new(7.0, 7.0)));
        let mut node = ComputedTransform::new(&mut uids);
        for _ in 0..16 {
            node.update(identity, &local);
            node.update_single(&local);
        }
        assert_eq!(identity.version(), 0, "nothing may mutate the identity node");
        assert_eq!(identity.matrix(), Affine::IDENTITY);
    }

    #[test]
    fn set_matrix_early_outs_on_equal_value() {
        let mut uids = UidSource::new();
        let mut t = ComputedTransform::new(&mut uids);
        assert!(t.set_matrix(Affine::scale(3.0)));
        let version = t.version();
        assert!(!t.set_matrix(Affine::scale(3.0)), "same value must not bump");
        assert_eq!(t.version(), version);
    }
}
