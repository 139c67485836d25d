use std::num::NonZeroU64;
use std::time::Duration;

/// Predicts when the display will present the next frame.
#[derive(Debug)]
pub struct FrameClock {
    last_presentation_time: Option<Duration>,
    refresh_interval_ns: Option<NonZeroU64>,
}

impl FrameClock {
    pub fn new(refresh_interval: Option<Duration>) -> Self {
        let refresh_interval_ns = refresh_interval
            .and_then(|interval| u64::try_from(interval.as_nanos()).ok())
            .and_then(NonZeroU64::new);

        Self {
            last_presentation_time: None,
            refresh_interval_ns,
        }
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_ns
            .map(|ns| Duration::from_nanos(ns.get()))
    }

    /// Records the time at which the host presented a frame.
    pub fn presented(&mut self, presentation_time: Duration) {
        if presentation_time.is_zero() {
            // Not interested in these.
            return;
        }

        self.last_presentation_time = Some(presentation_time);
    }

    /// Returns the first presentation time strictly after `now`.
    ///
    /// Without a known refresh interval or a past presentation, this is `now` itself.
    pub fn next_presentation_time_after(&self, mut now: Duration) -> Duration {
        let Some(refresh_interval_ns) = self.refresh_interval_ns else {
            return now;
        };
        let Some(last_presentation_time) = self.last_presentation_time else {
            return now;
        };

        let refresh_interval_ns = refresh_interval_ns.get();

        if now <= last_presentation_time {
            // Got an early VBlank.
            now += Duration::from_nanos(refresh_interval_ns);
        }

        let since_last = now.saturating_sub(last_presentation_time);
        let since_last_ns =
            since_last.as_secs() * 1_000_000_000 + u64::from(since_last.subsec_nanos());
        let to_next_ns = (since_last_ns / refresh_interval_ns + 1) * refresh_interval_ns;
        last_presentation_time + Duration::from_nanos(to_next_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(16);

    #[test]
    fn without_history_next_frame_is_now() {
        let clock = FrameClock::new(Some(INTERVAL));
        let now = Duration::from_millis(1000);
        assert_eq!(clock.next_presentation_time_after(now), now);

        let clock = FrameClock::new(None);
        assert_eq!(clock.refresh_interval(), None);
        assert_eq!(clock.next_presentation_time_after(now), now);
    }

    #[test]
    fn aligns_to_refresh_cycle() {
        let mut clock = FrameClock::new(Some(INTERVAL));
        clock.presented(Duration::from_millis(1000));

        assert_eq!(
            clock.next_presentation_time_after(Duration::from_millis(1005)),
            Duration::from_millis(1016)
        );
        assert_eq!(
            clock.next_presentation_time_after(Duration::from_millis(1040)),
            Duration::from_millis(1048)
        );
        assert_eq!(
            clock.next_presentation_time_after(Duration::from_millis(1016)),
            Duration::from_millis(1032)
        );
    }

    #[test]
    fn early_vblank_skips_to_following_frame() {
        let mut clock = FrameClock::new(Some(INTERVAL));
        clock.presented(Duration::from_millis(1000));

        assert_eq!(
            clock.next_presentation_time_after(Duration::from_millis(999)),
            Duration::from_millis(1016)
        );
    }

    #[test]
    fn zero_presentation_time_is_ignored() {
        let mut clock = FrameClock::new(Some(INTERVAL));
        clock.presented(Duration::ZERO);

        let now = Duration::from_millis(5);
        assert_eq!(clock.next_presentation_time_after(now), now);
    }

    #[test]
    fn zero_interval_is_treated_as_unknown() {
        let clock = FrameClock::new(Some(Duration::ZERO));
        assert_eq!(clock.refresh_interval(), None);
    }
}
