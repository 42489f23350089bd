//! Heading animation state machine.
//!
//! Raw heading samples arrive at an unpredictable rate and may jump across
//! the 0°/360° seam. [`HeadingAnimator`] turns them into a displayed angle
//! that either snaps (small changes) or sweeps along the shorter arc over a
//! fixed duration (large changes).
//!
//! A running job is never preempted. Targets that arrive mid-flight only
//! update the raw heading; when the job completes the animator re-observes
//! the latest raw heading, so the final resting angle always reflects the
//! most recent sample.

use std::time::{Duration, Instant};

use crate::angle::{lerp, normalize};

/// Heading changes smaller than this snap immediately.
pub const MIN_ANIMATE_THRESHOLD_DEGREES: f32 = 15.0;

/// Duration of a single heading sweep.
pub const ANIMATION_DURATION: Duration = Duration::from_millis(250);

/// A single in-flight sweep between two headings.
///
/// `goal_angle` is not normalized: it lies outside [0, 360) whenever the
/// shorter arc crosses the seam, so plain linear interpolation travels in
/// the right direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationJob {
    pub start_angle: f32,
    pub goal_angle: f32,
    pub start_time: Instant,
    pub duration: Duration,
}

impl AnimationJob {
    /// Fraction of the job completed at `now`, clamped to [0, 1].
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start_time);
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        progress.clamp(0.0, 1.0)
    }

    /// Displayed angle at `now`, normalized to [0, 360).
    pub fn angle_at(&self, now: Instant) -> f32 {
        normalize(lerp(self.start_angle, self.goal_angle, self.progress(now)))
    }
}

/// Converts discrete heading targets into a continuously varying angle.
#[derive(Debug, Clone, Default)]
pub struct HeadingAnimator {
    raw: f32,
    animated: Option<f32>,
    job: Option<AnimationJob>,
}

impl HeadingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new raw heading sample.
    ///
    /// The first sample ever snaps. While a job is running the sample is
    /// stored but otherwise ignored until that job completes.
    pub fn observe(&mut self, target: f32, now: Instant) {
        let target = normalize(target);
        self.raw = target;

        let Some(current) = self.animated else {
            self.animated = Some(target);
            return;
        };

        if self.job.is_some() {
            return;
        }

        let distance = (target - current).abs();
        let reverse = 360.0 - distance;
        let shortest = distance.min(reverse);

        if shortest < MIN_ANIMATE_THRESHOLD_DEGREES {
            self.animated = Some(target);
            return;
        }

        let goal_angle = if distance < reverse {
            target
        } else if target < current {
            target + 360.0
        } else {
            target - 360.0
        };

        self.job = Some(AnimationJob {
            start_angle: current,
            goal_angle,
            start_time: now,
            duration: ANIMATION_DURATION,
        });
    }

    /// Step the running job to `now`.
    ///
    /// Called once per frame with the frame's start time. On completion the
    /// job is cleared and the latest raw heading is observed again, which
    /// may start a follow-up sweep.
    pub fn advance(&mut self, now: Instant) {
        let Some(job) = self.job else {
            return;
        };

        let progress = job.progress(now);
        self.animated = Some(job.angle_at(now));

        if progress >= 1.0 {
            self.job = None;
            self.observe(self.raw, now);
        }
    }

    /// Displayed heading, `None` before the first sample.
    pub fn animated(&self) -> Option<f32> {
        self.animated
    }

    /// Latest raw heading sample (0.0 before the first sample).
    pub fn raw(&self) -> f32 {
        self.raw
    }

    pub fn job(&self) -> Option<&AnimationJob> {
        self.job.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.job.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn animator_at(heading: f32, now: Instant) -> HeadingAnimator {
        let mut animator = HeadingAnimator::new();
        animator.observe(heading, now);
        animator
    }

    #[test]
    fn test_first_observation_snaps() {
        let now = Instant::now();
        let animator = animator_at(200.0, now);

        assert_eq!(animator.animated(), Some(200.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_no_heading_before_first_sample() {
        let animator = HeadingAnimator::new();
        assert_eq!(animator.animated(), None);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_first_observation_is_normalized() {
        let now = Instant::now();
        let animator = animator_at(-10.0, now);
        assert_eq!(animator.animated(), Some(350.0));
        assert_eq!(animator.raw(), 350.0);
    }

    #[test]
    fn test_small_change_snaps() {
        let now = Instant::now();
        let mut animator = animator_at(10.0, now);

        animator.observe(20.0, now);

        assert_eq!(animator.animated(), Some(20.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_equal_target_creates_no_job() {
        let now = Instant::now();
        let mut animator = animator_at(90.0, now);
        animator.observe(90.0, now);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_threshold_boundary_animates() {
        let now = Instant::now();
        let mut animator = animator_at(10.0, now);
        animator.observe(25.0, now);
        assert!(animator.is_animating());
    }

    #[test]
    fn test_small_change_across_seam_snaps() {
        let now = Instant::now();
        let mut animator = animator_at(355.0, now);
        animator.observe(5.0, now);
        assert_eq!(animator.animated(), Some(5.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_direct_arc_goal() {
        let now = Instant::now();
        let mut animator = animator_at(10.0, now);
        animator.observe(180.0, now);

        let job = animator.job().copied().unwrap();
        assert_eq!(job.start_angle, 10.0);
        assert_eq!(job.goal_angle, 180.0);
        assert_eq!(job.duration, ANIMATION_DURATION);

        animator.advance(now + ANIMATION_DURATION / 2);
        assert!(approx(animator.animated().unwrap(), 95.0));
    }

    #[test]
    fn test_wrap_forward_through_seam() {
        let now = Instant::now();
        let mut animator = animator_at(350.0, now);
        animator.observe(10.0, now);

        let job = animator.job().copied().unwrap();
        assert_eq!(job.goal_angle, 370.0);

        // Halfway lands exactly on the seam
        animator.advance(now + ANIMATION_DURATION / 2);
        assert_eq!(animator.animated(), Some(0.0));

        animator.advance(now + ANIMATION_DURATION);
        assert!(approx(animator.animated().unwrap(), 10.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_wrap_backward_through_seam() {
        let now = Instant::now();
        let mut animator = animator_at(10.0, now);
        animator.observe(340.0, now);

        let job = animator.job().copied().unwrap();
        assert_eq!(job.goal_angle, -20.0);

        animator.advance(now + ANIMATION_DURATION / 2);
        assert!(approx(animator.animated().unwrap(), 355.0));
    }

    #[test]
    fn test_long_way_round_takes_shorter_arc() {
        // 10 -> 200 is 190 clockwise but 170 counter-clockwise
        let now = Instant::now();
        let mut animator = animator_at(10.0, now);
        animator.observe(200.0, now);

        let job = animator.job().copied().unwrap();
        assert_eq!(job.goal_angle, -160.0);

        animator.advance(now + ANIMATION_DURATION / 2);
        assert!(approx(animator.animated().unwrap(), 285.0));

        animator.advance(now + ANIMATION_DURATION);
        assert!(approx(animator.animated().unwrap(), 200.0));
    }

    #[test]
    fn test_job_not_preempted_by_new_target() {
        let now = Instant::now();
        let mut animator = animator_at(0.0, now);
        animator.observe(90.0, now);
        let original = animator.job().copied().unwrap();

        animator.observe(270.0, now + Duration::from_millis(50));

        assert_eq!(animator.job().copied(), Some(original));
        assert_eq!(animator.raw(), 270.0);
    }

    #[test]
    fn test_completion_reobserves_latest_target() {
        let now = Instant::now();
        let mut animator = animator_at(0.0, now);
        animator.observe(90.0, now);
        animator.observe(100.0, now + Duration::from_millis(10));
        animator.observe(180.0, now + Duration::from_millis(20));

        let done = now + ANIMATION_DURATION;
        animator.advance(done);

        // 90 -> 180 is a 90 degree change, so a follow-up sweep starts
        let follow_up = animator.job().copied().unwrap();
        assert_eq!(follow_up.start_angle, 90.0);
        assert_eq!(follow_up.goal_angle, 180.0);
        assert_eq!(follow_up.start_time, done);

        animator.advance(done + ANIMATION_DURATION);
        assert!(approx(animator.animated().unwrap(), 180.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_completion_snaps_to_nearby_latest_target() {
        let now = Instant::now();
        let mut animator = animator_at(0.0, now);
        animator.observe(90.0, now);
        animator.observe(95.0, now + Duration::from_millis(10));

        animator.advance(now + ANIMATION_DURATION);

        assert_eq!(animator.animated(), Some(95.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_advance_before_start_is_clamped() {
        let now = Instant::now() + Duration::from_secs(1);
        let mut animator = animator_at(0.0, now);
        animator.observe(90.0, now);

        animator.advance(now - Duration::from_millis(100));
        assert_eq!(animator.animated(), Some(0.0));
        assert!(animator.is_animating());
    }

    #[test]
    fn test_advance_past_end_is_clamped() {
        let now = Instant::now();
        let mut animator = animator_at(0.0, now);
        animator.observe(90.0, now);

        animator.advance(now + Duration::from_secs(10));
        assert_eq!(animator.animated(), Some(90.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_advance_without_job_is_noop() {
        let now = Instant::now();
        let mut animator = animator_at(42.0, now);
        animator.advance(now + Duration::from_secs(1));
        assert_eq!(animator.animated(), Some(42.0));
    }

    #[test]
    fn test_job_progress() {
        let now = Instant::now();
        let job = AnimationJob {
            start_angle: 0.0,
            goal_angle: 100.0,
            start_time: now,
            duration: Duration::from_millis(200),
        };
        assert_eq!(job.progress(now), 0.0);
        assert!(approx(job.progress(now + Duration::from_millis(50)), 0.25));
        assert_eq!(job.progress(now + Duration::from_millis(400)), 1.0);
    }
}
