// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cooperative cancellation for the tick loop.
//!
//! A [`ShutdownTrigger`] flips a `tokio::sync::watch` flag; every
//! [`Shutdown`] cloned from the same channel observes it. The driver only
//! checks the flag while sleeping between ticks, so an allocation change is
//! never interrupted halfway.

use tokio::sync::watch;

/// Creates a connected trigger/listener pair.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Requests shutdown.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // Listeners may already be gone; nothing to notify then.
        let _ = self.tx.send(true);
    }
}

/// Observes a shutdown request.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A listener that is never triggered.
    pub fn never() -> Self {
        let (trigger, shutdown) = channel();
        drop(trigger);
        shutdown
    }

    /// A listener triggered by Ctrl-C.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_ctrl_c() -> Self {
        let (trigger, shutdown) = channel();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("interrupt received, stopping after the current tick");
                    trigger.trigger();
                }
                Err(e) => tracing::warn!("cannot listen for Ctrl-C: {e}"),
            }
        });
        shutdown
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested.
    ///
    /// Never resolves if every trigger was dropped without firing.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
