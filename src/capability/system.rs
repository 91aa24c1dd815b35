//! System capability: blocking delay.

use std::thread;
use std::time::Duration;

pub trait System: Send + Sync {
    /// Block the calling thread for at least `milliseconds`.
    fn delay(&self, milliseconds: u64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSystem;

impl System for ThreadSystem {
    fn delay(&self, milliseconds: u64) {
        thread::sleep(Duration::from_millis(milliseconds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_delay_blocks_at_least_requested() {
        let start = Instant::now();
        ThreadSystem.delay(20);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_zero_delay_returns() {
        ThreadSystem.delay(0);
    }
}
