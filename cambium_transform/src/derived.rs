// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived caches: geometry and raycast projections keyed off a transform.
//!
//! The actual geometric algorithms live outside this crate. A producer
//! hands us a source artifact (mesh bounds, a pick ray) implementing
//! [`ProjectionSource`], and a projection type implementing
//! [`Projection`] that knows how to rewrite itself from a source and a
//! [`ComputedTransform`]. This module only decides *when* the projection
//! runs and owns the cached result.

use crate::transform::ComputedTransform;
use crate::uid::Fingerprint;

/// A source artifact that can be projected through a transform.
///
/// Validity is owned by the external producer: a source that currently has
/// no meaningful content (an empty mesh, an unset ray) reports `false` and
/// derivation yields nothing.
pub trait ProjectionSource {
    /// Whether this source currently holds meaningful content.
    fn is_valid(&self) -> bool;
}

/// A projection source that exposes a [`Fingerprint`], making its changes
/// detectable in O(1).
///
/// Required by [`RaycastCache`], which short-circuits re-derivation when
/// neither the source nor the owning transform changed. Producers can mint
/// the identity from the same [`UidSource`](crate::UidSource) as the
/// transforms.
pub trait VersionedSource: ProjectionSource {
    /// Fingerprint of the source's current state.
    fn fingerprint(&self) -> Fingerprint;
}

/// A derived artifact written by the external projection algorithm.
///
/// `project` is the authority on the actual geometry: it overwrites `self`
/// with the projection of `source` through `transform`. The `Default`
/// bound lets the cache bindings create the artifact lazily on first use.
pub trait Projection<S: ?Sized>: Default {
    /// Overwrite `self` with the projection of `source` through `transform`.
    fn project(&mut self, source: &S, transform: &ComputedTransform);
}

impl ComputedTransform {
    /// Update-or-create a derived projection of `source` through this
    /// transform.
    ///
    /// This is the shared pattern behind geometry-bounds and child-raycast
    /// derivation:
    ///
    /// - An absent or invalid source yields `None` and drops any previous
    ///   cache so stale data cannot resurface later.
    /// - Otherwise the cache is created if missing and re-projected
    ///   unconditionally. Derivation is cheap next to transform
    ///   composition, and callers gate these calls behind their own dirty
    ///   checks; see [`RaycastCache`] for the fingerprinted variant.
    ///
    /// The returned cache is owned by the caller, typically stored next to
    /// the node that owns this transform.
    pub fn update_child_projection<S, P>(&self, cache: Option<P>, source: Option<&S>) -> Option<P>
    where
        S: ProjectionSource,
        P: Projection<S>,
    {
        let source = match source {
            Some(source) if source.is_valid() => source,
            _ => return None,
        };
        let mut projected = cache.unwrap_or_default();
        projected.project(source, self);
        Some(projected)
    }
}

/// Lazily created raycast cache bound to one transform node.
///
/// Owns zero-or-one projected rays plus the fingerprints that gate
/// re-derivation: the projection is valid exactly while the owning
/// transform's version and the source's fingerprint both match what was
/// recorded at the last derivation. Kept outside [`ComputedTransform`] so
/// the node type stays independent of the producer's ray type.
#[derive(Debug)]
pub struct RaycastCache<P> {
    projected: Option<P>,
    seen_source: Option<Fingerprint>,
    seen_owner_version: Option<u64>,
}

impl<P> RaycastCache<P> {
    /// Create an empty cache; the first update always derives.
    pub const fn new() -> Self {
        Self {
            projected: None,
            seen_source: None,
            seen_owner_version: None,
        }
    }

    /// The cached projection, if the last update produced one.
    pub fn projected(&self) -> Option<&P> {
        self.projected.as_ref()
    }

    /// Re-derive the projection if the owning transform or the source
    /// changed, returning whether the cache contents changed.
    ///
    /// `owner` is the transform this cache belongs to, already updated for
    /// this frame. An absent or invalid source empties the cache (returns
    /// `true` if there was something to drop). When both the recorded
    /// owner version and source fingerprint match current state, this is a
    /// no-op returning `false`.
    pub fn update<S>(&mut self, owner: &ComputedTransform, source: Option<&S>) -> bool
    where
        S: VersionedSource,
        P: Projection<S>,
    {
        let source = match source {
            Some(source) if source.is_valid() => source,
            _ => {
                let had_projection = self.projected.is_some();
                self.projected = None;
                self.seen_source = None;
                self.seen_owner_version = None;
                return had_projection;
            }
        };

        let source_fp = source.fingerprint();
        if self.projected.is_some()
            && self.seen_source == Some(source_fp)
            && self.seen_owner_version == Some(owner.version())
        {
            return false;
        }

        let projected = self.projected.get_or_insert_with(P::default);
        projected.project(source, owner);
        self.seen_source = Some(source_fp);
        self.seen_owner_version = Some(owner.version());
        true
    }
}

impl<P> Default for RaycastCache<P> {
    fn default() -> Self {
        Self::new()
    }
}
