use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancelation` on Ctrl-C. Returns early when something else cancels it, so that a
/// finished single reminder doesn't wait for a signal.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received Ctrl-C"),
                Err(e) => error!("Failed to listen for Ctrl-C {e:?}"),
            }
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
