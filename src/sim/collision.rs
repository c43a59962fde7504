//! Collision detection and enter/stay/exit bookkeeping
//!
//! Overlap is recomputed from scratch every frame. The `CollisionMap` only
//! remembers which pairs overlapped last frame so the detector can tell a
//! fresh contact (enter) from a continuing one (stay) and a separation (exit).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::body::{Body, CollisionKind};
use super::entity::EntityId;

/// Unordered entity pair, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(EntityId, EntityId);

impl PairKey {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    #[inline]
    pub fn first(&self) -> EntityId {
        self.0
    }

    #[inline]
    pub fn second(&self) -> EntityId {
        self.1
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0 == id || self.1 == id
    }

    /// The member that is not `id`
    pub fn partner(&self, id: EntityId) -> Option<EntityId> {
        if self.0 == id {
            Some(self.1)
        } else if self.1 == id {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Edge of a pair's overlap state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    /// First frame of overlap
    Enter,
    /// Overlap continues from the previous frame
    Stay,
    /// First frame after overlap ended
    Exit,
}

/// A phase transition for one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub pair: PairKey,
    pub phase: ContactPhase,
}

/// Symmetric "currently overlapping" relation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionMap {
    pairs: BTreeSet<PairKey>,
}

impl CollisionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, a: EntityId, b: EntityId) -> bool {
        self.pairs.contains(&PairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Drop every pair involving `id` without emitting exits
    pub fn forget(&mut self, id: EntityId) {
        self.pairs.retain(|pair| !pair.contains(id));
    }

    /// Replace last frame's overlap set with this frame's and report edges.
    ///
    /// Enter/stay contacts come first in pair order, exits follow.
    pub fn update(&mut self, overlapping: impl IntoIterator<Item = PairKey>) -> Vec<Contact> {
        let current: BTreeSet<PairKey> = overlapping.into_iter().collect();
        let mut contacts = Vec::with_capacity(current.len());

        for &pair in &current {
            let phase = if self.pairs.contains(&pair) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            contacts.push(Contact { pair, phase });
        }
        for &pair in self.pairs.difference(&current) {
            contacts.push(Contact {
                pair,
                phase: ContactPhase::Exit,
            });
        }

        self.pairs = current;
        contacts
    }
}

/// Anything the detector can test
pub trait Collider {
    fn collider_id(&self) -> EntityId;
    fn body(&self) -> &Body;

    /// Colliders that resolve their own contacts (the player) are skipped in
    /// the outer loop but still found as partners.
    fn resolves_own_contacts(&self) -> bool {
        false
    }
}

/// Brute-force O(n²) sweep over the live set.
///
/// Bodies classified `None` are excluded from both loops.
pub fn overlapping_pairs<C: Collider>(items: &[C]) -> BTreeSet<PairKey> {
    let mut pairs = BTreeSet::new();
    for outer in items {
        if outer.body().kind == CollisionKind::None || outer.resolves_own_contacts() {
            continue;
        }
        for inner in items {
            if inner.collider_id() == outer.collider_id() || inner.body().kind == CollisionKind::None
            {
                continue;
            }
            let pair = PairKey::new(outer.collider_id(), inner.collider_id());
            if !pairs.contains(&pair) && outer.body().overlaps(inner.body()) {
                pairs.insert(pair);
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    struct Dummy {
        id: EntityId,
        body: Body,
        own: bool,
    }

    impl Collider for Dummy {
        fn collider_id(&self) -> EntityId {
            self.id
        }
        fn body(&self) -> &Body {
            &self.body
        }
        fn resolves_own_contacts(&self) -> bool {
            self.own
        }
    }

    fn dummy(id: EntityId, x: f32, kind: CollisionKind) -> Dummy {
        Dummy {
            id,
            body: Body::new(Vec2::new(x, 0.0), 10.0, 10.0, kind).unwrap(),
            own: false,
        }
    }

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new(7, 3), PairKey::new(3, 7));
        let pair = PairKey::new(9, 2);
        assert_eq!(pair.first(), 2);
        assert_eq!(pair.partner(2), Some(9));
        assert_eq!(pair.partner(9), Some(2));
        assert_eq!(pair.partner(5), None);
    }

    #[test]
    fn test_enter_stay_exit_sequence() {
        let mut map = CollisionMap::new();
        let pair = PairKey::new(1, 2);

        let first = map.update([pair]);
        assert_eq!(first, vec![Contact { pair, phase: ContactPhase::Enter }]);
        assert!(map.contains(2, 1));

        for _ in 0..3 {
            let stay = map.update([pair]);
            assert_eq!(stay, vec![Contact { pair, phase: ContactPhase::Stay }]);
        }

        let exit = map.update(std::iter::empty());
        assert_eq!(exit, vec![Contact { pair, phase: ContactPhase::Exit }]);
        assert!(map.is_empty());
        assert!(map.update(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_forget_drops_pairs_silently() {
        let mut map = CollisionMap::new();
        map.update([PairKey::new(1, 2), PairKey::new(2, 3), PairKey::new(4, 5)]);
        map.forget(2);
        assert_eq!(map.len(), 1);
        assert!(map.contains(4, 5));
    }

    #[test]
    fn test_none_bodies_are_excluded() {
        let items = vec![
            dummy(1, 0.0, CollisionKind::Solid),
            dummy(2, 5.0, CollisionKind::None),
            dummy(3, 8.0, CollisionKind::Trigger),
        ];
        let pairs = overlapping_pairs(&items);
        assert_eq!(pairs.into_iter().collect::<Vec<_>>(), vec![PairKey::new(1, 3)]);
    }

    #[test]
    fn test_self_resolving_collider_still_found_as_partner() {
        let mut player = dummy(1, 0.0, CollisionKind::Trigger);
        player.own = true;
        let items = vec![player, dummy(2, 5.0, CollisionKind::Trigger)];
        let pairs = overlapping_pairs(&items);
        assert!(pairs.contains(&PairKey::new(1, 2)));
        assert_eq!(pairs.len(), 1);
    }

    proptest! {
        /// Over any overlap trace, each contact run produces exactly one
        /// enter, then stays, then exactly one exit.
        #[test]
        fn prop_trace_produces_well_formed_runs(trace in proptest::collection::vec(any::<bool>(), 1..64)) {
            let mut map = CollisionMap::new();
            let pair = PairKey::new(10, 20);
            let mut was = false;
            for &now in &trace {
                let contacts = map.update(if now { vec![pair] } else { vec![] });
                let phases: Vec<_> = contacts.iter().map(|c| c.phase).collect();
                match (was, now) {
                    (false, true) => prop_assert_eq!(phases, vec![ContactPhase::Enter]),
                    (true, true) => prop_assert_eq!(phases, vec![ContactPhase::Stay]),
                    (true, false) => prop_assert_eq!(phases, vec![ContactPhase::Exit]),
                    (false, false) => prop_assert!(phases.is_empty()),
                }
                was = now;
            }
        }

        #[test]
        fn prop_map_is_symmetric(a in 0u32..50, b in 0u32..50) {
            prop_assume!(a != b);
            let mut map = CollisionMap::new();
            map.update([PairKey::new(a, b)]);
            prop_assert!(map.contains(a, b));
            prop_assert!(map.contains(b, a));
        }
    }
}
