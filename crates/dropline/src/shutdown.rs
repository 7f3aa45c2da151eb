// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal-driven graceful shutdown.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Install SIGINT/SIGTERM handlers and return the cancellation token
/// they trip. Every long-running task selects on this token.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trip = token.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
                _ = sigterm.recv() => info!("SIGTERM received"),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("ctrl-c received");
        }
        trip.cancel();
    });

    token
}
