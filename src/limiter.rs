use crate::error::Error;
use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Process-wide token bucket guarding the per-second request budget of the
/// Partner API. One instance is created at startup and shared by reference
/// into every call path; the real-world quota is global to the API key, so
/// the bucket must be too.
///
/// The bucket starts full. Capacity is kept small (default 2) on purpose:
/// it allows the advertised two immediate calls while preventing bursts
/// from draining the daily quota faster than intended.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_per_sec: f64,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    /// Credit `elapsed * rate` tokens, capped at capacity.
    fn refill(&mut self, capacity: f64, refill_per_sec: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity);
        self.last_refill = now;
    }
}

impl RateLimiter {
    /// A zero capacity or non-positive rate would make `acquire` hang
    /// forever, so both are rejected at construction time.
    pub fn new(capacity: u32, refill_per_sec: f64) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::Configuration(
                "rate limiter capacity must be at least 1".into(),
            ));
        }
        if refill_per_sec <= 0.0 || !refill_per_sec.is_finite() {
            return Err(Error::Configuration(format!(
                "rate limiter refill rate must be positive, got {}",
                refill_per_sec
            )));
        }
        Ok(Self {
            state: Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill: Instant::now(),
            }),
            capacity: capacity as f64,
            refill_per_sec,
        })
    }

    /// Block (suspend) until one permit is available, then consume it.
    ///
    /// The mutex is held only for the refill-and-check step, never across
    /// the sleep; waiters queue FIFO on the lock and re-check after waking,
    /// so losing a wake-up race just means another short wait. The token
    /// count is decremented only on the success path — a caller-side
    /// timeout that abandons the future cannot leak a permit.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut st = self.state.lock().await;
                st.refill(self.capacity, self.refill_per_sec);
                if st.tokens >= 1.0 {
                    st.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - st.tokens) / self.refill_per_sec)
            };
            debug!("rate limit reached, waiting {:?} for next permit", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Current token count after an on-the-spot refill. Diagnostic only
    /// (health reporting, tests); never a substitute for `acquire`.
    pub async fn available(&self) -> f64 {
        let mut st = self.state.lock().await;
        st.refill(self.capacity, self.refill_per_sec);
        st.tokens
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    pub fn refill_per_sec(&self) -> f64 {
        self.refill_per_sec
    }
}
