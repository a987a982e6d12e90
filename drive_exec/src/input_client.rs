//! # Input Client
//!
//! The InputClient recieves every asynchronous input of the drive: edge frames from the imaging
//! collaborator, headings from localisation, obstacle distances, stop sign detections and
//! operator telecommands. All of these are published as JSON [`InputMsg`]s to a single endpoint
//! which the client subscribes to.
//!
//! A background thread recieves messages as they arrive and writes them into the
//! [`SharedCtx`]. The control loop never waits on the network.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use log::{debug, error, info, warn};

use crate::{
    lane_est::LineSeg,
    loc,
    shared_ctx::{SharedCtx, VisionFrame},
};
use comms_if::{
    eqpt::{vision::EdgeFrameError, InputMsg},
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct InputClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InputClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not decode the frame: {0}")]
    FrameError(EdgeFrameError),

    #[error("Invalid heading: {0}")]
    HeadingError(loc::LocError),

    #[error("Obstacle distance must not be NaN")]
    NanObstacleDistance,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputClient {
    /// Create a new instance of the InputClient, starting the background thread.
    ///
    /// This function will not block until a publisher connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        shared: Arc<SharedCtx>,
    ) -> Result<Self, InputClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            subscribe: Some(String::new()),
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.input_endpoint)
            .map_err(InputClientError::SocketError)?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();

        let bg_jh = Some(thread::spawn(move || bg_thread(socket, bg_run_clone, shared)));

        Ok(Self { bg_jh, bg_run })
    }
}

impl Drop for InputClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("InputClient background thread panicked");
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Write a single input message into the shared context, as recieved at `now`.
pub fn handle_input_msg(
    shared: &SharedCtx,
    msg: InputMsg,
    now: Instant,
) -> Result<(), InputClientError> {
    match msg {
        InputMsg::Frame(frame) => {
            let image = frame.to_image().map_err(InputClientError::FrameError)?;
            let lines = frame
                .lines
                .as_ref()
                .map(|specs| specs.iter().map(LineSeg::from).collect());

            shared.set_frame(VisionFrame { image, lines }, now);
        }
        InputMsg::Heading(msg) => {
            let heading_deg = loc::heading_deg(&msg.heading).map_err(InputClientError::HeadingError)?;
            shared.set_heading_deg(heading_deg, now);
        }
        InputMsg::ObstacleDist { min_dist_m } => {
            if min_dist_m.is_nan() {
                return Err(InputClientError::NanObstacleDistance);
            }
            shared.set_obstacle_distance(min_dist_m);
        }
        InputMsg::StopSign { detected } => shared.stop_sign(detected, now),
        InputMsg::Tc(tc) => {
            info!("Recieved telecommand: {:?}", tc);
            shared.apply_tc(tc);
        }
    }

    Ok(())
}

/// Background thread, updates the shared context when a collaborator publishes something new.
fn bg_thread(socket: MonitoredSocket, run: Arc<AtomicBool>, shared: Arc<SharedCtx>) {
    while run.load(Ordering::Relaxed) {
        let msg: InputMsg = match socket.recv_json() {
            Ok(Some(m)) => m,
            Ok(None) => continue,
            Err(JsonMsgError::RecvError(e)) => {
                error!("Error recieving input message: {}", e);
                break;
            }
            Err(e) => {
                warn!("Discarding input message: {}", e);
                continue;
            }
        };

        if let Err(e) = handle_input_msg(&shared, msg, Instant::now()) {
            warn!("Discarding input message: {}", e);
        }
    }

    debug!("InputClient background thread stopped");
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::lane_est::EdgeImage;
    use chrono::Utc;
    use comms_if::{
        eqpt::{
            sens::{Heading, HeadingMsg},
            vision::{EdgeFrame, LineSpec},
        },
        tc::{DriveMode, DriveTc},
    };
    use std::time::Duration;

    fn shared() -> SharedCtx {
        SharedCtx::new(Duration::from_millis(1500), Duration::from_secs(5))
    }

    #[test]
    fn test_frame_msg() {
        let ctx = shared();
        let now = Instant::now();

        let frame = EdgeFrame::from_image(
            Utc::now(),
            &EdgeImage::new(8, 4),
            Some(vec![LineSpec::Endpoints {
                x1: 1,
                y1: 2,
                x2: 3,
                y2: 4,
            }]),
        );
        handle_input_msg(&ctx, InputMsg::Frame(frame.clone()), now).unwrap();

        let snap = ctx.snapshot();
        let stamped = snap.frame.unwrap();
        assert_eq!(stamped.value.image.dimensions(), (8, 4));
        assert_eq!(stamped.value.lines, Some(vec![LineSeg::new(1, 2, 3, 4)]));

        // Declared size does not match the data
        let bad = EdgeFrame { height: 5, ..frame };
        assert!(matches!(
            handle_input_msg(&ctx, InputMsg::Frame(bad), now),
            Err(InputClientError::FrameError(_))
        ));
        assert_eq!(ctx.snapshot().frame.map(|f| f.seq), Some(0));
    }

    #[test]
    fn test_other_msgs() {
        let ctx = shared();
        let now = Instant::now();

        let heading = HeadingMsg::new(Utc::now(), Heading::Yaw { deg: -10.0 });
        handle_input_msg(&ctx, InputMsg::Heading(heading), now).unwrap();
        assert_eq!(ctx.snapshot().heading_deg.map(|h| h.value), Some(350.0));

        handle_input_msg(&ctx, InputMsg::ObstacleDist { min_dist_m: 0.3 }, now).unwrap();
        assert_eq!(ctx.snapshot().safety.min_obstacle_distance_m, 0.3);
        assert!(handle_input_msg(&ctx, InputMsg::ObstacleDist { min_dist_m: f64::NAN }, now)
            .is_err());

        handle_input_msg(&ctx, InputMsg::StopSign { detected: true }, now).unwrap();
        assert!(ctx.snapshot().safety.stop_sign_active(now));

        handle_input_msg(&ctx, InputMsg::Tc(DriveTc::Start), now).unwrap();
        assert_eq!(ctx.snapshot().drive_mode, DriveMode::Auto);
    }

    #[test]
    fn test_json_input() {
        let json = r#"{"Heading": {
            "timestamp": 1700000000000,
            "heading": {"Quaternion": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}}
        }}"#;
        let msg: InputMsg = serde_json::from_str(json).unwrap();

        let ctx = shared();
        handle_input_msg(&ctx, msg, Instant::now()).unwrap();
        assert_eq!(ctx.snapshot().heading_deg.map(|h| h.value), Some(0.0));
    }
}
