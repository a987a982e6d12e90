//! # Shared Context
//!
//! The latest value of every asynchronous input of the control loop. Writers (the input client)
//! and the control loop share one context through an `Arc`. Every field is locked independently
//! so a large frame update never blocks a heading update.
//!
//! The control loop takes a [`CtxSnapshot`] at the start of each cycle and works only on that.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};

use log::{info, warn};

use crate::{
    act_gate::{Intents, SafetyState},
    lane_est::{EdgeImage, LineSeg},
};
use comms_if::tc::{DriveMode, DriveTc};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A value along with its arrival time and a sequence number counting arrivals.
#[derive(Debug, Clone)]
pub struct Stamped<T> {
    pub value: T,
    pub received: Instant,
    pub seq: u64,
}

/// A frame ready for processing.
#[derive(Debug)]
pub struct VisionFrame {
    pub image: EdgeImage,

    /// Lines supplied along with the frame. If `None` lines are detected from the image.
    pub lines: Option<Vec<LineSeg>>,
}

/// See the module level documentation.
pub struct SharedCtx {
    frame: Mutex<Option<Stamped<Arc<VisionFrame>>>>,

    heading_deg: Mutex<Option<Stamped<f64>>>,

    safety: Mutex<SafetyState>,

    drive_mode: Mutex<DriveMode>,

    intents: Mutex<Intents>,

    shutdown: AtomicBool,

    stop_sign_dwell: Duration,

    stop_sign_ignore: Duration,
}

/// Copy of the shared context at one instant.
#[derive(Debug, Clone)]
pub struct CtxSnapshot {
    pub frame: Option<Stamped<Arc<VisionFrame>>>,
    pub heading_deg: Option<Stamped<f64>>,
    pub safety: SafetyState,
    pub drive_mode: DriveMode,
    pub intents: Intents,
    pub shutdown: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SharedCtx {
    /// Create an empty context. Stop signs are held for `stop_sign_dwell` and repeats within
    /// `stop_sign_ignore` are ignored.
    pub fn new(stop_sign_dwell: Duration, stop_sign_ignore: Duration) -> Self {
        Self {
            frame: Mutex::new(None),
            heading_deg: Mutex::new(None),
            safety: Mutex::new(SafetyState::default()),
            drive_mode: Mutex::new(DriveMode::default()),
            intents: Mutex::new(Intents::default()),
            shutdown: AtomicBool::new(false),
            stop_sign_dwell,
            stop_sign_ignore,
        }
    }

    pub fn set_frame(&self, frame: VisionFrame, now: Instant) {
        let mut f = lock(&self.frame);
        let seq = f.as_ref().map_or(0, |s| s.seq + 1);

        *f = Some(Stamped {
            value: Arc::new(frame),
            received: now,
            seq,
        });
    }

    pub fn set_heading_deg(&self, heading_deg: f64, now: Instant) {
        let mut h = lock(&self.heading_deg);
        let seq = h.as_ref().map_or(0, |s| s.seq + 1);

        *h = Some(Stamped {
            value: heading_deg,
            received: now,
            seq,
        });
    }

    pub fn set_obstacle_distance(&self, min_dist_m: f64) {
        lock(&self.safety).min_obstacle_distance_m = min_dist_m;
    }

    /// Handle a stop sign detection event. Events with `detected == false` are ignored.
    pub fn stop_sign(&self, detected: bool, now: Instant) {
        if !detected {
            return;
        }

        if lock(&self.safety).register_stop_sign(now, self.stop_sign_dwell, self.stop_sign_ignore)
        {
            info!("Stop sign registered");
        }
    }

    /// Apply an operator telecommand.
    pub fn apply_tc(&self, tc: DriveTc) {
        match tc {
            DriveTc::ManualThrottle(v) => lock(&self.intents).manual_throttle = v,
            DriveTc::ManualSteer(v) => lock(&self.intents).manual_steer = v,
            DriveTc::AutoThrottle(v) => lock(&self.intents).auto_throttle = v,
            DriveTc::ModeToggle => {
                let mut m = lock(&self.drive_mode);
                *m = m.toggled();
            }
            DriveTc::SetMode(flag) => match DriveMode::from_flag(flag) {
                Ok(mode) => *lock(&self.drive_mode) = mode,
                Err(e) => warn!("Ignoring invalid telecommand: {}", e),
            },
            DriveTc::Stop => {
                lock(&self.intents).manual_throttle = 0;
                *lock(&self.drive_mode) = DriveMode::Manual;
            }
            DriveTc::Start => *lock(&self.drive_mode) = DriveMode::Auto,
            DriveTc::Shutdown => self.request_shutdown(),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Take a copy of the current context. Frames are shared rather than copied.
    pub fn snapshot(&self) -> CtxSnapshot {
        CtxSnapshot {
            frame: lock(&self.frame).clone(),
            heading_deg: lock(&self.heading_deg).clone(),
            safety: *lock(&self.safety),
            drive_mode: *lock(&self.drive_mode),
            intents: *lock(&self.intents),
            shutdown: self.shutdown_requested(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Lock a field. Every field holds plain data which is valid after any partial update, so a
/// poisoned lock is recovered.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn ctx() -> SharedCtx {
        SharedCtx::new(Duration::from_millis(1500), Duration::from_secs(5))
    }

    #[test]
    fn test_tcs() {
        let ctx = ctx();
        assert_eq!(ctx.snapshot().drive_mode, DriveMode::Manual);

        ctx.apply_tc(DriveTc::ManualThrottle(30));
        ctx.apply_tc(DriveTc::ManualSteer(-20));
        ctx.apply_tc(DriveTc::AutoThrottle(15));
        ctx.apply_tc(DriveTc::ModeToggle);

        let snap = ctx.snapshot();
        assert_eq!(snap.drive_mode, DriveMode::Auto);
        assert_eq!(
            snap.intents,
            Intents {
                manual_throttle: 30,
                manual_steer: -20,
                auto_throttle: 15
            }
        );

        ctx.apply_tc(DriveTc::Stop);
        let snap = ctx.snapshot();
        assert_eq!(snap.drive_mode, DriveMode::Manual);
        assert_eq!(snap.intents.manual_throttle, 0);
        assert_eq!(snap.intents.manual_steer, -20);

        ctx.apply_tc(DriveTc::Start);
        assert_eq!(ctx.snapshot().drive_mode, DriveMode::Auto);

        // Invalid flags leave the mode alone
        ctx.apply_tc(DriveTc::SetMode(7));
        assert_eq!(ctx.snapshot().drive_mode, DriveMode::Auto);
        ctx.apply_tc(DriveTc::SetMode(0));
        assert_eq!(ctx.snapshot().drive_mode, DriveMode::Manual);

        assert!(!ctx.snapshot().shutdown);
        ctx.apply_tc(DriveTc::Shutdown);
        assert!(ctx.snapshot().shutdown);
    }

    #[test]
    fn test_sequence_numbers() {
        let ctx = ctx();
        let now = Instant::now();

        assert!(ctx.snapshot().frame.is_none());

        for _ in 0..3 {
            ctx.set_frame(
                VisionFrame {
                    image: EdgeImage::new(2, 2),
                    lines: None,
                },
                now,
            );
        }
        ctx.set_heading_deg(10.0, now);

        let snap = ctx.snapshot();
        assert_eq!(snap.frame.map(|f| f.seq), Some(2));
        assert_eq!(snap.heading_deg.map(|h| (h.seq, h.value)), Some((0, 10.0)));
    }

    #[test]
    fn test_stop_sign_debounce() {
        let ctx = ctx();
        let t0 = Instant::now();

        ctx.stop_sign(false, t0);
        assert!(!ctx.snapshot().safety.stop_sign_active(t0));

        ctx.stop_sign(true, t0);
        ctx.stop_sign(true, t0 + Duration::from_secs(2));

        let safety = ctx.snapshot().safety;
        assert!(safety.stop_sign_active(t0 + Duration::from_millis(1400)));
        assert!(!safety.stop_sign_active(t0 + Duration::from_millis(2500)));

        ctx.set_obstacle_distance(0.2);
        assert!(ctx.snapshot().safety.obstacle_too_close(0.5));
    }
}
