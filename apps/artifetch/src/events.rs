//! Concurrent event draining while a command runs

use crate::logging::log_event;
use artifetch_events::EventReceiver;
use std::future::Future;
use tokio::select;

/// Drive `command` to completion while logging every event it emits
///
/// Events still buffered when the command finishes are drained before
/// returning, so nothing emitted during the run is lost.
pub async fn run_with_events<F, T>(command: F, mut receiver: EventReceiver) -> T
where
    F: Future<Output = T>,
{
    let mut command = Box::pin(command);

    loop {
        select! {
            result = &mut command => {
                while let Ok(event) = receiver.try_recv() {
                    log_event(&event);
                }
                return result;
            }

            event = receiver.recv() => {
                match event {
                    Some(event) => log_event(&event),
                    None => return command.await,
                }
            }
        }
    }
}
