// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identities and change-detection fingerprints.

/// Unique identity of a versioned value (a transform node or an external
/// projection source).
///
/// A `Uid` is minted once from a [`UidSource`] and never changes for the
/// lifetime of its owner. Together with a version counter it forms a
/// [`Fingerprint`] that uniquely names one observed state of one value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Uid(u64);

impl Uid {
    /// The reserved identity of the process-wide identity transform.
    ///
    /// Never produced by [`UidSource::mint`].
    pub const IDENTITY: Self = Self(0);
}

/// Monotonic counter handing out [`Uid`]s.
///
/// The counter is an explicit value rather than a hidden global so that
/// callers control its scope: an application typically keeps one per
/// process (or per scene), while tests construct a fresh one per case so
/// identities never collide across cases. Identities start at 1; 0 is
/// reserved for [`Uid::IDENTITY`]. The 64-bit width cannot wrap within a
/// session, which the fingerprint comparisons rely on.
#[derive(Debug)]
pub struct UidSource {
    next: u64,
}

impl UidSource {
    /// Create a source whose first minted identity is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Mint the next identity.
    pub fn mint(&mut self) -> Uid {
        let uid = Uid(self.next);
        self.next += 1;
        uid
    }
}

impl Default for UidSource {
    fn default() -> Self {
        Self::new()
    }
}

/// One observed state of a versioned value: its identity plus the value of
/// its version counter at observation time.
///
/// Because identities are unique and versions only grow, two equal
/// fingerprints always denote the exact same state of the exact same
/// value, which is what makes the O(1) staleness checks in
/// [`ComputedTransform`](crate::ComputedTransform) sound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Fingerprint {
    /// Identity of the observed value.
    pub uid: Uid,
    /// Version counter of the observed value at observation time.
    pub version: u64,
}
