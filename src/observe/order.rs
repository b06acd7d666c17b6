use crate::constants::NOTIFICATION_FRESHNESS_WINDOW_NANOS;
use crate::constants::OBSERVE_SEQUENCE_HALF;
use crate::constants::OBSERVE_SEQUENCE_MASK;
use crate::message::Response;

/// Order of a received notification: its observe sequence number and the
/// monotonic time it was received at.
///
/// Implements the freshness test of RFC 7641, section 3.4. Sequence numbers
/// wrap at 2^24; an order older than 128 seconds no longer restricts the
/// sequence numbers accepted after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationOrder {
    sequence: Option<u32>,
    timestamp: u64,
}

impl NotificationOrder {
    /// `sequence` is masked to 24 bits; `timestamp` is in nanoseconds.
    pub fn new(
        sequence: Option<u32>,
        timestamp: u64,
    ) -> Self {
        Self {
            sequence: sequence.map(|s| s & OBSERVE_SEQUENCE_MASK),
            timestamp,
        }
    }

    pub fn from_response(
        response: &Response,
        timestamp: u64,
    ) -> Self {
        Self::new(response.observe(), timestamp)
    }

    pub fn sequence(&self) -> Option<u32> {
        self.sequence
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Returns `true` if a notification with `candidate_sequence`, received at
    /// `candidate_timestamp`, is fresher than this one.
    pub fn is_fresher(
        &self,
        candidate_sequence: u32,
        candidate_timestamp: u64,
    ) -> bool {
        let v2 = candidate_sequence & OBSERVE_SEQUENCE_MASK;
        let fresher_sequence = match self.sequence {
            None => true,
            Some(v1) => (v1 < v2 && v2 - v1 < OBSERVE_SEQUENCE_HALF) || (v1 > v2 && v1 - v2 > OBSERVE_SEQUENCE_HALF),
        };
        fresher_sequence
            || candidate_timestamp
                .checked_sub(self.timestamp)
                .is_some_and(|elapsed| elapsed > NOTIFICATION_FRESHNESS_WINDOW_NANOS)
    }

    /// Returns `true` if `candidate` is fresher than this order. A candidate
    /// without sequence number is a final response and always fresher.
    pub fn is_newer(
        &self,
        candidate: &NotificationOrder,
    ) -> bool {
        match candidate.sequence {
            None => true,
            Some(sequence) => self.is_fresher(sequence, candidate.timestamp),
        }
    }

    /// Returns `true` if `response`, received at `timestamp`, must be
    /// delivered after this order.
    pub fn is_new(
        &self,
        response: &Response,
        timestamp: u64,
    ) -> bool {
        self.is_newer(&NotificationOrder::from_response(response, timestamp))
    }
}
