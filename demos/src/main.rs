// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-graph walker demo.
//!
//! Plays the role of the external driver from the `cambium_transform`
//! contract: it owns the tree, walks it top-down once per frame, and feeds
//! each node's local transform plus its parent's already-updated world
//! transform into the node's world cache. Run it to watch the fingerprint
//! memoization at work: frame 2 recomputes nothing, and after a single
//! local mutation only the affected subtree recomputes.

use cambium_transform::{
    ComputedTransform, Fingerprint, Projection, ProjectionSource, RaycastCache, Uid, UidSource,
    VersionedSource,
};
use kurbo::{Affine, Point, Vec2};
use smallvec::SmallVec;

/// A scene node: authored local transform plus tree links.
///
/// Nodes are stored in an arena with parents at lower indices than their
/// children, which is what lets the walker borrow the parent's world
/// transform immutably while updating the child's.
struct SceneNode {
    name: &'static str,
    parent: Option<usize>,
    children: SmallVec<[usize; 4]>,
    local: ComputedTransform,
}

struct Scene {
    nodes: Vec<SceneNode>,
    worlds: Vec<ComputedTransform>,
}

impl Scene {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            worlds: Vec::new(),
        }
    }

    fn insert(
        &mut self,
        name: &'static str,
        parent: Option<usize>,
        local_matrix: Affine,
        uids: &mut UidSource,
    ) -> usize {
        let idx = self.nodes.len();
        let mut local = ComputedTransform::new(uids);
        local.set_matrix(local_matrix);
        self.nodes.push(SceneNode {
            name,
            parent,
            children: SmallVec::new(),
            local,
        });
        self.worlds.push(ComputedTransform::new(uids));
        if let Some(p) = parent {
            assert!(p < idx, "parents must be inserted before their children");
            self.nodes[p].children.push(idx);
        }
        idx
    }

    /// One frame: walk depth-first, parents strictly before children.
    ///
    /// No pruning on `changed == false` — the point of the demo is that
    /// the fingerprint check alone already turns untouched nodes into
    /// no-ops. Returns how many nodes actually recomputed.
    fn propagate(&mut self) -> usize {
        let mut recomputed = 0;
        let mut stack: SmallVec<[usize; 16]> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| i)
            .rev()
            .collect();

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            let changed = match node.parent {
                None => {
                    let identity = ComputedTransform::identity();
                    self.worlds[idx].update(identity, &node.local)
                }
                Some(p) => {
                    // `p < idx` by construction, so split to borrow both.
                    let (head, tail) = self.worlds.split_at_mut(idx);
                    tail[0].update(&head[p], &node.local)
                }
            };
            if changed {
                println!("    recomputed {}", node.name);
                recomputed += 1;
            }
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        recomputed
    }
}

/// World-space pick ray published by the input layer.
struct PickRay {
    origin: Point,
    valid: bool,
    uid: Uid,
    version: u64,
}

impl ProjectionSource for PickRay {
    fn is_valid(&self) -> bool {
        self.valid
    }
}

impl VersionedSource for PickRay {
    fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            uid: self.uid,
            version: self.version,
        }
    }
}

/// The ray rewritten into one node's local space.
#[derive(Default)]
struct LocalPickRay {
    origin: Point,
}

impl Projection<PickRay> for LocalPickRay {
    fn project(&mut self, source: &PickRay, transform: &ComputedTransform) {
        self.origin = transform.matrix().inverse() * source.origin;
    }
}

fn main() {
    let mut uids = UidSource::new();
    let mut scene = Scene::new();

    let root = scene.insert(
        "root",
        None,
        Affine::translate(Vec2::new(100.0, 100.0)),
        &mut uids,
    );
    let arm = scene.insert(
        "arm",
        Some(root),
        Affine::rotate(30_f64.to_radians()),
        &mut uids,
    );
    let hand = scene.insert(
        "hand",
        Some(arm),
        Affine::translate(Vec2::new(40.0, 0.0)),
        &mut uids,
    );
    let _badge = scene.insert("badge", Some(root), Affine::scale(0.5), &mut uids);

    let total = scene.nodes.len();
    println!("frame 1 (cold):");
    let n = scene.propagate();
    println!("  -> {n} of {total} nodes recomputed");

    println!("frame 2 (nothing touched):");
    let n = scene.propagate();
    println!("  -> {n} of {total} nodes recomputed");

    println!("frame 3 (arm rotated):");
    scene.nodes[arm]
        .local
        .set_matrix(Affine::rotate(45_f64.to_radians()));
    let n = scene.propagate();
    println!("  -> {n} of {total} nodes recomputed (arm subtree only)");
    assert_eq!(n, 2, "only arm and hand should have recomputed");

    // Project a pick ray into the hand's local space; the cache re-derives
    // only when the hand's world transform or the ray itself moves.
    let mut ray = PickRay {
        origin: Point::new(150.0, 120.0),
        valid: true,
        uid: uids.mint(),
        version: 0,
    };
    let mut cache = RaycastCache::<LocalPickRay>::new();

    let changed = cache.update(&scene.worlds[hand], Some(&ray));
    let local = cache.projected().expect("ray is valid");
    println!(
        "ray derive 1: changed={changed}, local origin = ({:.2}, {:.2})",
        local.origin.x, local.origin.y
    );

    let changed = cache.update(&scene.worlds[hand], Some(&ray));
    println!("ray derive 2: changed={changed} (short-circuited)");

    ray.origin = Point::new(160.0, 120.0);
    ray.version += 1;
    let changed = cache.update(&scene.worlds[hand], Some(&ray));
    println!("ray derive 3: changed={changed} (ray moved)");
}
