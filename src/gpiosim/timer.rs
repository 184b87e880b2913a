use log::error;
use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

/// Cancellable one-shot. The callback runs on its own thread after `delay`
/// unless the handle is cancelled or dropped first, so replacing the handle
/// kept in a pending-timer slot supersedes the old timer.
///
/// Cancellation is best-effort once the delay has elapsed: a callback that
/// already woke may still run, so consumers that re-arm must pair the slot
/// with an arming epoch and drop stale firings themselves.
pub struct OneShot {
    cancel: Sender<()>,
}

impl OneShot {
    pub fn schedule<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, armed) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("oneshot".into())
            .spawn(move || match armed.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => f(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            });

        if let Err(err) = spawned {
            error!("failed to spawn one-shot timer thread: {err}");
        }

        Self { cancel }
    }

    pub fn cancel(&self) {
        let _ = self.cancel.send(());
    }
}

#[cfg(test)]
mod test {
    use super::OneShot;
    use std::{
        sync::mpsc,
        time::{Duration, Instant},
    };

    #[test]
    fn fires_after_delay() {
        let (tx, rx) = mpsc::channel();
        let armed = Instant::now();

        let _timer = OneShot::schedule(Duration::from_millis(20), move || {
            tx.send(armed.elapsed()).unwrap();
        });

        let elapsed = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(elapsed >= Duration::from_millis(20));
    }

    #[test]
    fn cancel_prevents_firing() {
        let (tx, rx) = mpsc::channel();

        let timer = OneShot::schedule(Duration::from_millis(20), move || {
            tx.send(()).unwrap();
        });
        timer.cancel();

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn dropping_the_handle_cancels() {
        let (tx, rx) = mpsc::channel();

        let timer = OneShot::schedule(Duration::from_millis(20), move || {
            tx.send(()).unwrap();
        });
        drop(timer);

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn replacing_a_slot_supersedes_the_old_timer() {
        let (tx, rx) = mpsc::channel();

        let tx1 = tx.clone();
        let mut slot = Some(OneShot::schedule(Duration::from_millis(30), move || {
            tx1.send(1).unwrap();
        }));

        slot.replace(OneShot::schedule(Duration::from_millis(60), move || {
            tx.send(2).unwrap();
        }));

        assert_eq!(Ok(2), rx.recv_timeout(Duration::from_secs(2)));
        drop(slot);
    }
}
