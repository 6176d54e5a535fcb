use tokio::task::AbortHandle;

/// Result of a request that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    /// A newer request (or a cancel) happened after this one started.
    Superseded,
}

/// Monotonic request counter. A reply is current only if it carries the
/// latest value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0
    }

    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, tag: u64) -> bool {
        self.0 == tag
    }
}

/// At most one outstanding request of a kind. Starting a new one aborts the
/// old task and invalidates any reply it may already have queued.
#[derive(Debug, Default)]
pub struct RequestSlot {
    generation: Generation,
    in_flight: Option<AbortHandle>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is running and hand out the tag for the next request.
    pub fn begin(&mut self) -> u64 {
        self.cancel();
        self.generation.current()
    }

    /// Register the task started for the tag returned by [`begin`](Self::begin).
    pub fn attach(&mut self, handle: AbortHandle) {
        self.in_flight = Some(handle);
    }

    /// Abort the in-flight task (if any) and bump the generation so a reply
    /// that raced the abort is still discarded.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.generation.advance();
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Match a reply against the current generation.
    pub fn resolve<T>(&mut self, tag: u64, value: T) -> Outcome<T> {
        if self.generation.is_current(tag) {
            self.in_flight = None;
            Outcome::Completed(value)
        } else {
            Outcome::Superseded
        }
    }
}
