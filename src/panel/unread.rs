//! Unread counter heuristic
//!
//! Recomputed from scratch on every message-list change; nothing is
//! persisted. This is a "has this been attended recently" signal, not a
//! read-receipt model.

use crate::panel::models::{Message, MessageOrigin};
use chrono::{DateTime, Duration, Utc};

/// Trailing window in which messages count as recent
pub const UNREAD_WINDOW_MINUTES: i64 = 30;

/// Count recent un-responded client/bot messages for one conversation
///
/// `messages` must be that conversation's messages in ascending timestamp
/// order. Scans newest-to-oldest inside the trailing window, counting
/// non-operator messages; the first operator message (or the window
/// boundary) stops the scan.
pub fn recent_unread<'a, I>(messages: I, now: DateTime<Utc>) -> usize
where
    I: DoubleEndedIterator<Item = &'a Message>,
{
    let cutoff = now - Duration::minutes(UNREAD_WINDOW_MINUTES);
    let mut count = 0;
    for message in messages.rev() {
        if message.timestamp < cutoff {
            break;
        }
        if message.origin == MessageOrigin::Operator {
            break;
        }
        count += 1;
    }
    count
}
