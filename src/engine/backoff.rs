// * Escalating backoff for malformed structured-data payloads
// * Delays grow linearly: base + increment, base + 2 * increment, ... and the
// * sequence ends as soon as the next delay would reach the ceiling.

use std::time::Duration;

use crate::config::settings::RetrySettings;

#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    increment: Duration,
    ceiling: Duration,
}

impl Backoff {
    pub fn new(settings: &RetrySettings) -> Self {
        Self {
            current: settings.base_delay,
            increment: settings.increment,
            ceiling: settings.ceiling,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.current.checked_add(self.increment)?;
        if delay >= self.ceiling {
            return None;
        }
        self.current = delay;
        Some(delay)
    }
}
