// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cambium Transform: versioned, cache-coherent 2D transform propagation.
//!
//! A scene graph recomputes each node's world-space affine transform by
//! composing the node's local transform with its parent's world transform.
//! Re-deriving every matrix every frame is wasteful when most of the graph
//! is static, so this crate makes each computed transform *versioned*: a
//! [`ComputedTransform`] carries a unique identity and a counter that bumps
//! exactly once per matrix change, and remembers the `(identity, version)`
//! [`Fingerprint`]s of the inputs it last composed. An update whose inputs
//! still carry the recorded fingerprints is a guaranteed O(1) no-op.
//!
//! ## What this crate is (and is not)
//!
//! This crate owns the *when*, not the *what*:
//!
//! - The affine algebra is [`kurbo::Affine`] (the six coefficients
//!   `[a, b, c, d, tx, ty]`, with `parent * local` applying the local
//!   transform first).
//! - Scene-graph structure, traversal order, and node ownership belong to
//!   the caller. The walker must update parents before children within a
//!   frame; in exchange every update and staleness check is O(1).
//! - Geometry-bounds and ray-projection algorithms belong to external
//!   producers behind the [`ProjectionSource`]/[`Projection`] traits; this
//!   crate decides when to invoke them and caches their results.
//!
//! Everything is single-threaded plain data: no locks, no suspension
//! points. Disjoint subtrees may be walked from different threads, but a
//! node shared between traversals must be serialized by the caller.
//!
//! ## Key types
//!
//! - [`ComputedTransform`] – world matrix + version + identity, with the
//!   forward ([`update`](ComputedTransform::update)), copying
//!   ([`update_single`](ComputedTransform::update_single)), and reverse
//!   ([`update_reverse_child`](ComputedTransform::update_reverse_child))
//!   update flavors, and [`identity`](ComputedTransform::identity) as the
//!   implicit root parent.
//! - [`UidSource`] – explicit monotonic identity counter, injected into
//!   node construction so tests and tools can scope it.
//! - [`RaycastCache`] – node-level raycast binding that re-derives only
//!   when the owning transform or the versioned ray source changed.
//!
//! ## Example
//!
//! ```rust
//! use cambium_transform::{ComputedTransform, UidSource};
//! use kurbo::{Affine, Vec2};
//!
//! let mut uids = UidSource::new();
//!
//! // A scene node's authored local transform and its world-space cache.
//! let mut local = ComputedTransform::new(&mut uids);
//! local.set_matrix(Affine::translate(Vec2::new(5.0, 5.0)));
//! let mut world = ComputedTransform::new(&mut uids);
//!
//! // Roots compose against the shared identity transform.
//! assert!(world.update(ComputedTransform::identity(), &local));
//! // Nothing changed, so the second pass is a no-op.
//! assert!(!world.update(ComputedTransform::identity(), &local));
//! ```
//!
//! This crate is `no_std` (enable the `libm` feature instead of the
//! default `std` feature) and does not allocate.

#![no_std]

mod derived;
mod transform;
mod uid;

pub use derived::{Projection, ProjectionSource, RaycastCache, VersionedSource};
pub use transform::ComputedTransform;
pub use uid::{Fingerprint, Uid, UidSource};
