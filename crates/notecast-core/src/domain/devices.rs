//! Device identity and the subscription set.
//!
//! Device listings are refreshed repeatedly (at startup, on demand, and on a
//! poll).  [`SubscriptionSet`] records which devices already have a live
//! subscription so that a refresh only subscribes to newcomers.  The handle
//! type `H` is whatever keeps a subscription alive; dropping it releases the
//! device.

use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of an input device (its port name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Devices with a live subscription, keyed by [`DeviceId`].
#[derive(Debug)]
pub struct SubscriptionSet<H> {
    entries: BTreeMap<DeviceId, H>,
}

impl<H> Default for SubscriptionSet<H> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<H> SubscriptionSet<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids from `current` that are not yet subscribed, in input order,
    /// without duplicates.
    pub fn pending(&self, current: &[DeviceId]) -> Vec<DeviceId> {
        let mut out: Vec<DeviceId> = Vec::new();
        for id in current {
            if !self.entries.contains_key(id) && !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }

    /// Records a subscription.  An existing handle for the same id is replaced
    /// and returned.
    pub fn insert(&mut self, id: DeviceId, handle: H) -> Option<H> {
        self.entries.insert(id, handle)
    }

    /// Drops subscriptions for devices missing from `current` and returns
    /// their ids.
    pub fn retain_present(&mut self, current: &[DeviceId]) -> Vec<DeviceId> {
        let gone: Vec<DeviceId> = self
            .entries
            .keys()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect();
        for id in &gone {
            self.entries.remove(id);
        }
        gone
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribed ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &DeviceId> {
        self.entries.keys()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<DeviceId> {
        names.iter().map(|n| DeviceId::from(*n)).collect()
    }

    #[test]
    fn test_pending_returns_only_unsubscribed_ids() {
        // Arrange
        let mut set: SubscriptionSet<()> = SubscriptionSet::new();
        set.insert(DeviceId::from("a"), ());

        // Act
        let pending = set.pending(&ids(&["a", "b", "c"]));

        // Assert
        assert_eq!(pending, ids(&["b", "c"]));
    }

    #[test]
    fn test_pending_deduplicates_repeated_ids() {
        let set: SubscriptionSet<()> = SubscriptionSet::new();
        assert_eq!(set.pending(&ids(&["a", "a"])), ids(&["a"]));
    }

    #[test]
    fn test_pending_is_empty_after_all_inserted() {
        let mut set = SubscriptionSet::new();
        let current = ids(&["a", "b"]);
        for id in set.pending(&current) {
            set.insert(id, 0u8);
        }
        assert!(set.pending(&current).is_empty());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_retain_present_removes_vanished_devices() {
        // Arrange
        let mut set = SubscriptionSet::new();
        set.insert(DeviceId::from("a"), 1);
        set.insert(DeviceId::from("b"), 2);

        // Act
        let gone = set.retain_present(&ids(&["b"]));

        // Assert
        assert_eq!(gone, ids(&["a"]));
        assert!(!set.contains(&DeviceId::from("a")));
        assert!(set.contains(&DeviceId::from("b")));
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut set = SubscriptionSet::new();
        set.insert(DeviceId::from("zeta"), ());
        set.insert(DeviceId::from("alpha"), ());
        let listed: Vec<&str> = set.ids().map(DeviceId::as_str).collect();
        assert_eq!(listed, vec!["alpha", "zeta"]);
    }
}
