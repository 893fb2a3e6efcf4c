//! Serial announcement pacing.
//!
//! Items wait a short pre-dispatch delay, go out one at a time, and hold the
//! channel for an estimated reading time before the next one may start.

use crate::config::EngineConfig;
use crate::timers::{TimerId, TimerQueue};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementPacing {
    pub pre_dispatch_delay: Duration,
    pub min_read: Duration,
    pub read_per_char: Duration,
}

impl Default for AnnouncementPacing {
    fn default() -> Self {
        Self {
            pre_dispatch_delay: Duration::from_millis(120),
            min_read: Duration::from_millis(400),
            read_per_char: Duration::from_millis(40),
        }
    }
}

impl AnnouncementPacing {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            pre_dispatch_delay: config.pre_dispatch_delay(),
            min_read: config.min_read(),
            read_per_char: config.read_per_char(),
        }
    }

    /// Approximate reading time, never below the configured floor.
    pub fn read_duration(&self, text: &str) -> Duration {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        self.min_read.max(self.read_per_char.saturating_mul(chars))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub read_duration: Duration,
}

/// Timer payloads the queue schedules on its owner's [`TimerQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncerTimer {
    Dispatch,
    ReadComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting(TimerId),
    Reading(TimerId),
}

#[derive(Debug)]
pub struct AnnouncementQueue {
    pacing: AnnouncementPacing,
    pending: VecDeque<Announcement>,
    phase: Phase,
}

impl AnnouncementQueue {
    pub fn new(pacing: AnnouncementPacing) -> Self {
        Self {
            pacing,
            pending: VecDeque::new(),
            phase: Phase::Idle,
        }
    }

    pub fn pacing(&self) -> AnnouncementPacing {
        self.pacing
    }

    /// Undispatched items, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|item| item.text.as_str())
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.phase, Phase::Reading(_))
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.pending.is_empty()
    }

    pub fn enqueue<T: From<AnnouncerTimer>>(&mut self, text: &str, timers: &mut TimerQueue<T>) {
        let text = text.trim();
        if text.is_empty() {
            trace!("Ignoring blank announcement");
            return;
        }
        self.pending.push_back(Announcement {
            text: text.to_string(),
            read_duration: self.pacing.read_duration(text),
        });
        if self.phase == Phase::Idle {
            self.schedule_dispatch(timers);
        }
    }

    /// Drops undispatched items. An announcement already being read keeps
    /// its slot until its read time elapses.
    pub fn clear<T>(&mut self, timers: &mut TimerQueue<T>) {
        let dropped = self.pending.len();
        self.pending.clear();
        if let Phase::Waiting(id) = self.phase {
            timers.cancel(id);
            self.phase = Phase::Idle;
        }
        if dropped > 0 {
            debug!(dropped, "Cleared pending announcements");
        }
    }

    /// Handles a fired dispatch timer, returning the item to speak now.
    pub fn on_dispatch_due<T: From<AnnouncerTimer>>(
        &mut self,
        id: TimerId,
        timers: &mut TimerQueue<T>,
    ) -> Option<Announcement> {
        if self.phase != Phase::Waiting(id) {
            trace!(?id, "Ignoring stale dispatch timer");
            return None;
        }
        let Some(item) = self.pending.pop_front() else {
            self.phase = Phase::Idle;
            return None;
        };
        let read = timers.schedule(item.read_duration, T::from(AnnouncerTimer::ReadComplete));
        self.phase = Phase::Reading(read);
        Some(item)
    }

    pub fn on_read_complete<T: From<AnnouncerTimer>>(
        &mut self,
        id: TimerId,
        timers: &mut TimerQueue<T>,
    ) {
        if self.phase != Phase::Reading(id) {
            trace!(?id, "Ignoring stale read timer");
            return;
        }
        self.phase = Phase::Idle;
        if !self.pending.is_empty() {
            self.schedule_dispatch(timers);
        }
    }

    /// Forgets everything, cancelling this queue's own timer.
    pub fn reset<T>(&mut self, timers: &mut TimerQueue<T>) {
        self.pending.clear();
        match self.phase {
            Phase::Waiting(id) | Phase::Reading(id) => {
                timers.cancel(id);
            }
            Phase::Idle => {}
        }
        self.phase = Phase::Idle;
    }

    fn schedule_dispatch<T: From<AnnouncerTimer>>(&mut self, timers: &mut TimerQueue<T>) {
        let id = timers.schedule(
            self.pacing.pre_dispatch_delay,
            T::from(AnnouncerTimer::Dispatch),
        );
        self.phase = Phase::Waiting(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Drives the queue until `until`, returning (dispatch time, text).
    fn run(
        queue: &mut AnnouncementQueue,
        timers: &mut TimerQueue<AnnouncerTimer>,
        until: Duration,
    ) -> Vec<(Duration, String)> {
        let mut spoken = Vec::new();
        while let Some((id, timer)) = timers.pop_due(until) {
            match timer {
                AnnouncerTimer::Dispatch => {
                    if let Some(item) = queue.on_dispatch_due(id, timers) {
                        spoken.push((timers.now(), item.text));
                    }
                }
                AnnouncerTimer::ReadComplete => queue.on_read_complete(id, timers),
            }
        }
        spoken
    }

    #[test]
    fn read_duration_has_a_floor() {
        let pacing = AnnouncementPacing::default();
        assert_eq!(pacing.read_duration("End"), ms(400));
        assert_eq!(pacing.read_duration("Exited math mode"), ms(640));
    }

    #[test]
    fn items_are_dispatched_serially_in_order() {
        let mut timers = TimerQueue::new();
        let mut queue = AnnouncementQueue::new(AnnouncementPacing::default());
        queue.enqueue("first", &mut timers);
        queue.enqueue("Exited math mode", &mut timers);
        queue.enqueue("third", &mut timers);

        let spoken = run(&mut queue, &mut timers, Duration::from_secs(5));
        assert_eq!(
            spoken,
            vec![
                (ms(120), "first".to_string()),
                (ms(640), "Exited math mode".to_string()),
                (ms(1_400), "third".to_string()),
            ]
        );
        assert!(queue.is_idle());
    }

    #[test]
    fn nothing_is_spoken_before_the_pre_dispatch_delay() {
        let mut timers = TimerQueue::new();
        let mut queue = AnnouncementQueue::new(AnnouncementPacing::default());
        queue.enqueue("hello", &mut timers);
        assert!(run(&mut queue, &mut timers, ms(119)).is_empty());
        assert_eq!(run(&mut queue, &mut timers, ms(120)).len(), 1);
    }

    #[test]
    fn clear_drops_waiting_items_but_not_the_one_in_flight() {
        let mut timers = TimerQueue::new();
        let mut queue = AnnouncementQueue::new(AnnouncementPacing::default());
        queue.enqueue("in flight", &mut timers);
        queue.enqueue("stale", &mut timers);
        assert_eq!(run(&mut queue, &mut timers, ms(120)).len(), 1);
        assert!(queue.is_reading());

        queue.clear(&mut timers);
        queue.enqueue("fresh", &mut timers);
        let spoken = run(&mut queue, &mut timers, Duration::from_secs(5));
        assert_eq!(spoken, vec![(ms(640), "fresh".to_string())]);
    }

    #[test]
    fn clear_before_dispatch_cancels_the_timer() {
        let mut timers = TimerQueue::new();
        let mut queue = AnnouncementQueue::new(AnnouncementPacing::default());
        queue.enqueue("never", &mut timers);
        queue.clear(&mut timers);
        assert!(timers.is_empty());
        assert!(queue.is_idle());
        assert!(run(&mut queue, &mut timers, Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn blank_text_is_ignored() {
        let mut timers = TimerQueue::<AnnouncerTimer>::new();
        let mut queue = AnnouncementQueue::new(AnnouncementPacing::default());
        queue.enqueue("   ", &mut timers);
        assert!(timers.is_empty());
        assert_eq!(queue.pending().count(), 0);
    }

    #[test]
    fn reset_cancels_reading_timer() {
        let mut timers = TimerQueue::new();
        let mut queue = AnnouncementQueue::new(AnnouncementPacing::default());
        queue.enqueue("one", &mut timers);
        queue.enqueue("two", &mut timers);
        run(&mut queue, &mut timers, ms(120));
        queue.reset(&mut timers);
        assert!(timers.is_empty());
        assert!(queue.is_idle());
    }
}
