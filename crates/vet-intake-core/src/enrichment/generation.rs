//! Request-generation counters for discarding stale async results.
//!
//! Every async lookup takes a [`Ticket`] for its channel when it starts.
//! Issuing a newer ticket (or invalidating the channel) makes older tickets
//! stale; their results are dropped on arrival.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Independent streams of enrichment requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    EmailCheck,
    AppointmentTypes,
    Zone,
    Providers,
    Breeds,
    Alerts,
    Slots,
}

/// Proof of which generation a request was issued under.
#[derive(Debug, Clone)]
pub struct Ticket {
    channel: Channel,
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl Ticket {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once a newer request was issued on the same channel.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

/// Per-channel generation counters.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    counters: BTreeMap<Channel, Arc<AtomicU64>>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket on `channel`.
    pub fn issue(&mut self, channel: Channel) -> Ticket {
        let counter = self.counter(channel);
        let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            channel,
            generation,
            counter,
        }
    }

    /// Make every outstanding ticket on `channel` stale.
    pub fn invalidate(&mut self, channel: Channel) {
        self.counter(channel).fetch_add(1, Ordering::SeqCst);
    }

    fn counter(&mut self, channel: Channel) -> Arc<AtomicU64> {
        self.counters.entry(channel).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes() {
        let mut generations = RequestGenerations::new();
        let first = generations.issue(Channel::Zone);
        assert!(first.is_current());

        let second = generations.issue(Channel::Zone);
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_channels_are_independent() {
        let mut generations = RequestGenerations::new();
        let zone = generations.issue(Channel::Zone);
        generations.issue(Channel::Slots);
        generations.invalidate(Channel::Providers);
        assert!(zone.is_current());
    }

    #[test]
    fn test_invalidate() {
        let mut generations = RequestGenerations::new();
        let slots = generations.issue(Channel::Slots);
        generations.invalidate(Channel::Slots);
        assert!(!slots.is_current());
    }
}
