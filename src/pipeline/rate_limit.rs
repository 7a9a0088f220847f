/*!
 * Token-paced, concurrency-capped request gate.
 *
 * Every provider call must hold a permit while the request is in flight.
 * `acquire` first waits for a concurrency slot (FIFO), then enforces the
 * configured inter-request interval plus a small random jitter to
 * desynchronize bursts. The permit releases its slot on drop, so success
 * and failure paths behave identically.
 */

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};

/// Upper bound of the random jitter added to each paced dispatch
const MAX_JITTER_MS: u64 = 200;

/// Requests-per-second paced, concurrency-capped limiter.
///
/// Two instances exist per pipeline: one tuned for translation providers,
/// one for the slower and costlier polish backend.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    /// Minimum spacing between dispatches
    interval: Duration,
    /// Maximum number of in-flight requests
    max_concurrent: usize,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    in_flight: usize,
    /// Earliest instant the next dispatch may happen
    next_dispatch: Option<Instant>,
    /// FIFO queue of acquirers waiting for a concurrency slot
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// RAII release handle; dropping it frees the slot and wakes the next waiter
pub struct RateLimitPermit {
    inner: Arc<Inner>,
}

impl RateLimiter {
    /// Create a limiter with the given pacing and concurrency cap
    pub fn new(requests_per_second: u32, max_concurrent: usize) -> Self {
        let rps = requests_per_second.max(1);
        Self {
            inner: Arc::new(Inner {
                interval: Duration::from_millis(1000 / rps as u64),
                max_concurrent: max_concurrent.max(1),
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Limiter tuned for the translation providers
    pub fn for_translation() -> Self {
        Self::new(10, 10)
    }

    /// Limiter tuned for the polish backend, which is slower and costlier
    pub fn for_polish() -> Self {
        Self::new(5, 5)
    }

    /// Acquire a dispatch permit, waiting for a slot and for pacing.
    ///
    /// The returned permit must live for the duration of the network call.
    pub async fn acquire(&self) -> RateLimitPermit {
        // Concurrency gate: take a slot or join the FIFO queue. A releaser
        // transfers its slot directly to the waiter it wakes.
        let waiter = {
            let mut state = self.inner.state.lock();
            if state.in_flight < self.inner.max_concurrent {
                state.in_flight += 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            }
        };

        if let Some(rx) = waiter {
            debug!("Rate limiter at capacity, queueing acquirer");
            // The sender half is only dropped through Inner::release, which
            // always sends first, so this cannot fail in practice
            let _ = rx.await;
        }

        // Pacing gate: reserve the next dispatch instant under the lock so
        // concurrent acquirers serialize their start times
        let (start_at, paced) = {
            let mut state = self.inner.state.lock();
            let now = Instant::now();
            let (earliest, paced) = match state.next_dispatch {
                Some(next) if next > now => (next, true),
                _ => (now, false),
            };
            state.next_dispatch = Some(earliest + self.inner.interval);
            (earliest, paced)
        };

        if paced {
            let jitter = Duration::from_millis(rand::rng().random_range(0..MAX_JITTER_MS));
            sleep_until(start_at + jitter).await;
        }

        RateLimitPermit {
            inner: self.inner.clone(),
        }
    }

    /// Current number of in-flight permits
    pub fn in_flight(&self) -> usize {
        self.inner.state.lock().in_flight
    }
}

impl Inner {
    fn release(&self) {
        let mut state = self.state.lock();
        // Hand the slot to the next live waiter instead of freeing it, so
        // wakeups stay FIFO
        while let Some(tx) = state.waiters.pop_front() {
            if tx.send(()).is_ok() {
                return;
            }
        }
        state.in_flight -= 1;
    }
}

impl Drop for RateLimitPermit {
    fn drop(&mut self) {
        self.inner.release();
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.inner.interval)
            .field("max_concurrent", &self.inner.max_concurrent)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_within_capacity_should_not_block_on_slots() {
        let limiter = RateLimiter::new(1000, 3);
        let _p1 = limiter.acquire().await;
        let _p2 = limiter.acquire().await;
        let _p3 = limiter.acquire().await;
        assert_eq!(limiter.in_flight(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_beyond_capacity_should_queue_until_release() {
        let limiter = RateLimiter::new(1000, 2);
        let p1 = limiter.acquire().await;
        let _p2 = limiter.acquire().await;
        assert_eq!(limiter.in_flight(), 2);

        let queued = {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _permit = limiter.acquire().await;
            })
        };

        // Give the queued task a chance to enqueue; it must still be waiting
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!queued.is_finished());
        assert_eq!(limiter.in_flight(), 2);

        drop(p1);
        tokio::time::timeout(Duration::from_secs(5), queued)
            .await
            .expect("queued acquirer should proceed after a release")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_on_failure_path_should_free_slot() {
        let limiter = RateLimiter::new(1000, 1);
        {
            let _permit = limiter.acquire().await;
            // Simulated failed call: permit dropped by scope exit
        }
        assert_eq!(limiter.in_flight(), 0);
        let _again = limiter.acquire().await;
        assert_eq!(limiter.in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_should_be_paced_by_interval() {
        let limiter = RateLimiter::new(10, 10);
        let start = Instant::now();
        let _p1 = limiter.acquire().await;
        let _p2 = limiter.acquire().await;
        let _p3 = limiter.acquire().await;
        // Third dispatch cannot start earlier than two full intervals
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
