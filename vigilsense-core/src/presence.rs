use std::time::{Duration, Instant};

use serde::Deserialize;

/// Minimum spacing between two "presence detected" notifications.
pub const ALERT_COOLDOWN: Duration = Duration::from_secs(30);

/// Detections at or below this confidence are not counted.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// One detected object in a frame, as reported by the detector collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    /// Pixel box as `[x, y, width, height]`, kept for annotation only.
    #[serde(default)]
    pub bbox: [f32; 4],
}

/// Count of tracked-class detections above the confidence threshold.
pub fn count_tracked(detections: &[Detection], label: &str) -> usize {
    detections
        .iter()
        .filter(|d| d.label == label && d.confidence > CONFIDENCE_THRESHOLD)
        .count()
}

/// Outbound notification intent produced by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Presence(usize),
    Clear,
}

impl Alert {
    pub fn message(&self) -> String {
        match self {
            Alert::Presence(count) => format!("presence detected, count={count}"),
            Alert::Clear => "area clear".to_string(),
        }
    }
}

/// Debounces presence-change notifications over per-frame detection counts.
///
/// "Presence" alerts are gated by the cooldown; "clear" alerts never are.
/// The cooldown clock only advances through [`mark_alerted`], which the
/// caller invokes after a notification was confirmed sent, so a failed
/// dispatch leaves the tracker free to alert again immediately.
///
/// [`mark_alerted`]: PresenceTracker::mark_alerted
#[derive(Debug)]
pub struct PresenceTracker {
    current_count: usize,
    previous_count: usize,
    last_alert: Option<Instant>,
    cooldown: Duration,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::with_cooldown(ALERT_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            current_count: 0,
            previous_count: 0,
            last_alert: None,
            cooldown,
        }
    }

    /// Feed one frame's detection count; returns the alert to dispatch, if
    /// any. `previous_count` advances on every count change, whether or not
    /// an alert was emitted.
    pub fn update(&mut self, count: usize, now: Instant) -> Option<Alert> {
        self.current_count = count;

        if count == self.previous_count {
            return None;
        }
        self.previous_count = count;

        if count > 0 {
            let ready = self
                .last_alert
                .map_or(true, |at| now.duration_since(at) >= self.cooldown);
            ready.then_some(Alert::Presence(count))
        } else {
            // count dropped to zero from a positive count: always announce.
            Some(Alert::Clear)
        }
    }

    /// Record a confirmed successful dispatch, starting the cooldown window.
    pub fn mark_alerted(&mut self, now: Instant) {
        self.last_alert = Some(now);
    }

    pub fn current_count(&self) -> usize {
        self.current_count
    }

    pub fn previous_count(&self) -> usize {
        self.previous_count
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_then_clear_sequence() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        assert_eq!(tracker.update(0, now), None);
        assert_eq!(tracker.update(2, now), Some(Alert::Presence(2)));
        tracker.mark_alerted(now);
        // Repeated count: no intent, no state change.
        assert_eq!(tracker.update(2, now), None);
        assert_eq!(tracker.update(0, now), Some(Alert::Clear));
    }

    #[test]
    fn presence_within_cooldown_is_suppressed_but_count_advances() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        assert_eq!(tracker.update(3, now), Some(Alert::Presence(3)));
        tracker.mark_alerted(now);
        assert_eq!(tracker.update(0, now + Duration::from_secs(1)), Some(Alert::Clear));
        tracker.mark_alerted(now + Duration::from_secs(1));

        // Second appearance two seconds in: suppressed by the 30s window.
        assert_eq!(tracker.update(1, now + Duration::from_secs(2)), None);
        assert_eq!(tracker.previous_count(), 1);
    }

    #[test]
    fn presence_after_cooldown_fires_again() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        assert_eq!(tracker.update(1, now), Some(Alert::Presence(1)));
        tracker.mark_alerted(now);
        tracker.update(0, now);

        let later = now + ALERT_COOLDOWN;
        assert_eq!(tracker.update(2, later), Some(Alert::Presence(2)));
    }

    #[test]
    fn clear_bypasses_cooldown() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        tracker.update(2, now);
        tracker.mark_alerted(now);
        let verdict = tracker.update(0, now + Duration::from_millis(10));

        assert_eq!(verdict, Some(Alert::Clear));
    }

    #[test]
    fn failed_dispatch_leaves_cooldown_unset() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        // Intent emitted but dispatch failed: mark_alerted never called.
        assert_eq!(tracker.update(1, now), Some(Alert::Presence(1)));

        // The very next change may alert again despite the 30s window.
        let soon = now + Duration::from_secs(1);
        tracker.update(0, soon);
        assert_eq!(tracker.update(4, soon), Some(Alert::Presence(4)));
    }

    #[test]
    fn zero_to_zero_never_alerts() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        assert_eq!(tracker.update(0, now), None);
        assert_eq!(tracker.update(0, now + ALERT_COOLDOWN), None);
    }

    #[test]
    fn current_count_tracks_every_frame() {
        let mut tracker = PresenceTracker::new();
        let now = Instant::now();

        tracker.update(5, now);
        assert_eq!(tracker.current_count(), 5);
        tracker.update(5, now);
        assert_eq!(tracker.current_count(), 5);
    }

    #[test]
    fn tracked_count_filters_label_and_confidence() {
        let detections = vec![
            Detection { label: "person".into(), confidence: 0.9, bbox: [0.0; 4] },
            Detection { label: "person".into(), confidence: 0.5, bbox: [0.0; 4] },
            Detection { label: "dog".into(), confidence: 0.95, bbox: [0.0; 4] },
            Detection { label: "person".into(), confidence: 0.51, bbox: [0.0; 4] },
        ];

        assert_eq!(count_tracked(&detections, "person"), 2);
    }
}
