// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability tracking for the remote service.
//!
//! The [`ConnectivityMonitor`] holds the current online/offline flag and
//! broadcasts [`ConnectivityEvent`]s on transition edges only. The flag is
//! atomic so reads never wait on the probe task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::transport::Transport;

const EVENT_CAPACITY: usize = 16;

/// Current reachability of the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Online => "online",
            Connectivity::Offline => "offline",
        }
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reachability transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// Offline → online. Triggers a drain.
    Restored,
    /// Online → offline. Aborts the drain in progress.
    Lost,
}

/// Tracks reachability and fans transitions out to subscribers.
pub struct ConnectivityMonitor {
    online: AtomicBool,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConnectivityMonitor {
            online: AtomicBool::new(initial == Connectivity::Online),
            events,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn state(&self) -> Connectivity {
        Connectivity::from_reachable(self.is_online())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    /// Record the current state. Emits and returns an event only when the
    /// state actually changed.
    pub fn set(&self, state: Connectivity) -> Option<ConnectivityEvent> {
        let online = state == Connectivity::Online;
        let was_online = self.online.swap(online, Ordering::AcqRel);
        if was_online == online {
            return None;
        }

        let event = if online {
            ConnectivityEvent::Restored
        } else {
            ConnectivityEvent::Lost
        };
        info!(connectivity = %state, "connectivity changed");
        // No subscribers is fine.
        let _ = self.events.send(event);
        Some(event)
    }

    /// Probe the remote every `interval` until `cancel` fires.
    ///
    /// The first probe runs immediately.
    pub fn spawn_probe_loop<T: Transport>(
        self: &Arc<Self>,
        transport: Arc<T>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let reachable = transport.probe().await;
                        debug!(reachable, "connectivity probe");
                        monitor.set(Connectivity::from_reachable(reachable));
                    }
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
