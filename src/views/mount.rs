//! View lifetime tracking for in-flight requests
//!
//! A page owns a [`Mount`]. Requests started by the page run through a
//! [`MountToken`]; once the page is unmounted their results are dropped
//! instead of being written into state nobody displays anymore.

use std::future::Future;

use tokio::sync::watch;

pub struct Mount {
    tx: watch::Sender<bool>,
}

impl Mount {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx }
    }

    pub fn token(&self) -> MountToken {
        MountToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn unmount(&self) {
        self.tx.send_replace(false);
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[derive(Clone)]
pub struct MountToken {
    rx: watch::Receiver<bool>,
}

impl MountToken {
    pub fn is_mounted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Run `fut` while the view is mounted. Resolves to `None`, abandoning
    /// `fut`, as soon as the view goes away.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        if !self.is_mounted() {
            return None;
        }

        let mut rx = self.rx.clone();
        tokio::select! {
            output = fut => self.is_mounted().then_some(output),
            _ = rx.wait_for(|mounted| !*mounted) => None,
        }
    }
}
