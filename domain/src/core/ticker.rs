//! Throttled status messages for the control loop.

/// Counts control ticks and fires once every `delay_seconds`.
///
/// The loop calls [`MessageTicker::tick`] every period; it returns the
/// running message count when it is time to emit, `None` otherwise.
#[derive(Debug, Clone)]
pub struct MessageTicker {
    message: String,
    throttle_ticks: u32,
    remaining: u32,
    count: u64,
    enabled: bool,
}

impl MessageTicker {
    pub fn new(message: impl Into<String>, delay_seconds: u32, period_ms: i32) -> Self {
        // period of zero or less would divide by zero
        let period = period_ms.max(1) as u32;
        let throttle_ticks = (delay_seconds.saturating_mul(1000) / period).max(1);
        Self {
            message: message.into(),
            throttle_ticks,
            remaining: throttle_ticks,
            count: 0,
            enabled: true,
        }
    }

    pub fn tick(&mut self) -> Option<u64> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }
        self.remaining = self.throttle_ticks;
        if !self.enabled {
            return None;
        }
        self.count += 1;
        Some(self.count)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn enable(&mut self, yn: bool) {
        self.enabled = yn;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
