//! Process-wide shutdown of the notifyme daemon.
//!
//! A `Kill` request or a termination signal calls [`send_exit`]. Long-running tasks on the async side
//! are wrapped in [`until_exit`], so they stop once that happens, even if they subscribed late.

use std::future::Future;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tokio::sync::watch;

static APPLICATION_EXIT: Lazy<watch::Sender<bool>> = Lazy::new(|| watch::channel(false).0);

/// Notify all listening tasks that the daemon is shutting down.
pub fn send_exit() -> Result<()> {
    APPLICATION_EXIT.send_replace(true);
    Ok(())
}

pub fn is_exiting() -> bool {
    *APPLICATION_EXIT.borrow()
}

/// Yields Ok(()) once the daemon is shutting down.
pub async fn recv_exit() -> Result<()> {
    let mut exit = APPLICATION_EXIT.subscribe();
    exit.wait_for(|exiting| *exiting).await.context("Failed to receive lifecycle event")?;
    Ok(())
}

/// Drive `future` until it completes or the daemon shuts down, whichever happens first.
pub async fn until_exit<F: Future>(future: F) -> Option<F::Output> {
    tokio::select! {
        Ok(()) = recv_exit() => None,
        output = future => Some(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_is_seen_by_late_subscribers() {
        assert_eq!(until_exit(async { 3 }).await, Some(3));

        send_exit().unwrap();
        assert!(is_exiting());
        recv_exit().await.unwrap();
        assert_eq!(until_exit(std::future::pending::<()>()).await, None);
    }
}
