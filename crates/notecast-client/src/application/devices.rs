//! Input device discovery and subscription.
//!
//! A [`DeviceSource`] lists attached devices and opens subscriptions on them.
//! [`DeviceRegistry`] calls it on every refresh and keeps a
//! [`SubscriptionSet`] so each device is subscribed exactly once, no matter
//! how often the device list is refreshed.  Devices that disappear are
//! forgotten, so the same device plugged back in is subscribed again.

use std::any::Any;
use std::fmt;

use notecast_core::{DeviceId, DeviceNoteEvent, SubscriptionSet};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors reported by a [`DeviceSource`].
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device backend could not be initialised or queried.
    #[error("device backend unavailable: {0}")]
    Backend(String),

    #[error("device '{0}' is no longer present")]
    NotFound(DeviceId),

    #[error("could not open device '{device}': {reason}")]
    Connect { device: DeviceId, reason: String },
}

/// A note event tagged with the device that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEvent {
    pub device: DeviceId,
    pub note: DeviceNoteEvent,
}

/// Where subscriptions push their events.
pub type DeviceSink = mpsc::UnboundedSender<DeviceEvent>;

/// Keeps a device subscription alive.  Dropping it closes the device.
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl Subscription {
    pub fn new<T: 'static>(guard: T) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }

    /// A subscription with nothing behind it.
    pub fn detached() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// Enumerates devices and opens subscriptions on them.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceSource {
    /// Ids of the devices attached right now.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Backend`] if the device list cannot be read.
    fn list(&self) -> Result<Vec<DeviceId>, DeviceError>;

    /// Opens `device` and forwards its note events to `sink`.
    ///
    /// # Errors
    ///
    /// [`DeviceError`] if the device vanished or cannot be opened.
    fn subscribe(&self, device: &DeviceId, sink: DeviceSink) -> Result<Subscription, DeviceError>;
}

/// Outcome of one [`DeviceRegistry::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChanges {
    /// Every device listed by the source.
    pub current: Vec<DeviceId>,
    /// Newly subscribed devices.
    pub added: Vec<DeviceId>,
    /// Devices whose subscription was dropped because they vanished.
    pub removed: Vec<DeviceId>,
}

impl DeviceChanges {
    pub fn is_changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// `"Inputs: a, b"`
    pub fn summary(&self) -> String {
        let names: Vec<&str> = self.current.iter().map(DeviceId::as_str).collect();
        format!("Inputs: {}", names.join(", "))
    }
}

pub struct DeviceRegistry {
    source: Box<dyn DeviceSource>,
    sink: DeviceSink,
    subscriptions: SubscriptionSet<Subscription>,
}

impl DeviceRegistry {
    pub fn new(source: Box<dyn DeviceSource>, sink: DeviceSink) -> Self {
        Self {
            source,
            sink,
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Re-reads the device list, drops vanished devices, and subscribes to new
    /// ones.  A device that fails to open is left out and retried on the next
    /// refresh.
    ///
    /// # Errors
    ///
    /// Propagates [`DeviceError`] from [`DeviceSource::list`].
    pub fn refresh(&mut self) -> Result<DeviceChanges, DeviceError> {
        let current = self.source.list()?;
        let removed = self.subscriptions.retain_present(&current);

        let mut added = Vec::new();
        for id in self.subscriptions.pending(&current) {
            match self.source.subscribe(&id, self.sink.clone()) {
                Ok(subscription) => {
                    debug!(device = %id, "subscribed to input device");
                    self.subscriptions.insert(id.clone(), subscription);
                    added.push(id);
                }
                Err(e) => warn!(device = %id, "failed to subscribe: {e}"),
            }
        }

        Ok(DeviceChanges {
            current,
            added,
            removed,
        })
    }

    pub fn subscribed(&self) -> impl Iterator<Item = &DeviceId> {
        self.subscriptions.ids()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
