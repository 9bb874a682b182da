//! Connectivity monitor: single source of truth for "are we online".
//!
//! The host platform feeds its online/offline signal into
//! [`ConnectivityMonitor::set_online`]; everything else either polls the
//! current boolean through a [`ConnectivityHandle`] (reads do this, per
//! call) or subscribes to transitions (the sync manager does this, via
//! [`crate::sync::spawn_autosync`]).

use tokio::sync::watch;

/// Owns the online/offline state.
pub struct ConnectivityMonitor {
  tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
  pub fn new(online: bool) -> Self {
    let (tx, _rx) = watch::channel(online);
    Self { tx }
  }

  /// Record the platform signal. Only a real transition notifies
  /// subscribers, so a repeated "online" can never re-trigger a sync.
  pub fn set_online(&self, online: bool) {
    self.tx.send_if_modified(|state| {
      if *state == online {
        false
      } else {
        *state = online;
        true
      }
    });
  }

  pub fn is_online(&self) -> bool {
    *self.tx.borrow()
  }

  /// Cloneable read-only handle for per-call checks.
  pub fn handle(&self) -> ConnectivityHandle {
    ConnectivityHandle {
      rx: self.tx.subscribe(),
    }
  }

  /// Raw transition stream; each change event is one flip of the state.
  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.tx.subscribe()
  }
}

/// Read-only view of the connectivity state.
#[derive(Debug, Clone)]
pub struct ConnectivityHandle {
  rx: watch::Receiver<bool>,
}

impl ConnectivityHandle {
  pub fn is_online(&self) -> bool {
    *self.rx.borrow()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn handle_tracks_state() {
    let monitor = ConnectivityMonitor::new(true);
    let handle = monitor.handle();

    assert!(handle.is_online());
    monitor.set_online(false);
    assert!(!handle.is_online());
  }

  #[test]
  fn repeated_signal_is_not_a_transition() {
    let monitor = ConnectivityMonitor::new(true);
    let mut rx = monitor.subscribe();
    rx.borrow_and_update();

    monitor.set_online(true);
    assert!(!rx.has_changed().unwrap());

    monitor.set_online(false);
    assert!(rx.has_changed().unwrap());
  }
}
