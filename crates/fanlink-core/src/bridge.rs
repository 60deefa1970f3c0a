// ── Session facade ──
//
// Wires one device session together: binds the link, spawns the
// telemetry listener, and runs the interactive controller on the caller's
// task. Exactly two long-lived activities exist per session.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::console::{Console, Screen};
use crate::controller::Controller;
use crate::error::CoreError;
use crate::link::{DatagramSource, Link};
use crate::listener::TelemetryListener;
use crate::session::Session;

/// A bound, not-yet-running device session.
pub struct Bridge {
    config: BridgeConfig,
    session: Arc<Session>,
    link: Link,
}

impl Bridge {
    /// Bind the datagram link. Bind failures are fatal for the session.
    pub async fn bind(config: BridgeConfig) -> Result<Self, CoreError> {
        let link = Link::bind(config.bind).await?;
        info!(local_addr = %link.local_addr(), "listening for telemetry");

        Ok(Self {
            config,
            session: Arc::new(Session::new()),
            link,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.link.local_addr()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Run until the operator quits, input ends, `shutdown` fires, or the
    /// listener hits a receive error.
    ///
    /// Whichever side finishes first cancels `shutdown`, which stops the
    /// other. A listener failure is reported after the controller stops.
    pub async fn run<C: Console>(
        self,
        console: C,
        screen: Arc<dyn Screen>,
        shutdown: CancellationToken,
    ) -> Result<(), CoreError> {
        let source = self.link.clone();
        self.run_with_source(source, console, screen, shutdown).await
    }

    /// Like [`Bridge::run`], but the listener reads from `source` instead of
    /// the bound link. Commands still go out over the link.
    pub async fn run_with_source<C: Console, S: DatagramSource>(
        self,
        source: S,
        console: C,
        screen: Arc<dyn Screen>,
        shutdown: CancellationToken,
    ) -> Result<(), CoreError> {
        let listener =
            TelemetryListener::new(Arc::clone(&self.session), source, Arc::clone(&screen));
        let listener_shutdown = shutdown.clone();
        let listener_task = tokio::spawn(async move {
            let result = listener.run(listener_shutdown.clone()).await;
            listener_shutdown.cancel();
            result
        });

        let mut controller =
            Controller::new(self.session, self.link, console, screen, self.config);
        let controller_result = controller.run(&shutdown).await;

        // Closing the session stops the listener's receive loop.
        shutdown.cancel();
        let listener_result = match listener_task.await {
            Ok(result) => result,
            Err(err) => Err(CoreError::ListenerStopped(err.to_string())),
        };

        debug!("session closed");
        controller_result.and(listener_result)
    }
}
