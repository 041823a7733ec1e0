//! Race a blocking call against a timer.
//!
//! The call runs on its own thread. When the timer wins, the caller gets
//! [`Error::Timeout`] and the thread is left to finish; its result is dropped.

use crate::error::{Error, Result};
use log::warn;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

pub fn with_timeout<T, F>(limit: Duration, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // Receiver may be gone after a timeout.
        let _ = sender.send(f());
    });
    match receiver.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!("gave up waiting after {:?}", limit);
            Err(Error::Timeout(limit))
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(Error::Network("request worker exited without a response".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_call_wins() {
        let got = with_timeout(Duration::from_secs(5), || Ok(42)).unwrap();
        assert_eq!(got, 42);
    }

    #[test]
    fn slow_call_times_out() {
        let got: Result<i32> = with_timeout(Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            Ok(1)
        });
        assert_eq!(got, Err(Error::Timeout(Duration::from_millis(20))));
    }

    #[test]
    fn errors_pass_through() {
        let got: Result<i32> =
            with_timeout(Duration::from_secs(5), || Err(Error::NotFound("x".into())));
        assert!(matches!(got, Err(Error::NotFound(_))));
    }
}
