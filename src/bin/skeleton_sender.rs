//! Sends a synthetic OSCeleton stream (a skeleton swaying in place) to a
//! receiver, for exercising the receiver without a depth sensor.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::{Duration, Instant};

use osceleton_receiver::message::{JointUpdate, OrientationUpdate};
use osceleton_receiver::sender::SkeletonSender;
use osceleton_receiver::{Joint, SkeletonMessage};

#[derive(Parser, Debug)]
#[command(name = "skeleton_sender", about = "Send synthetic OSCeleton skeleton messages")]
struct Cli {
    /// Receiver address.
    #[arg(long, default_value = "127.0.0.1:7110")]
    target: String,

    /// Number of simulated users.
    #[arg(long, default_value = "1")]
    users: i32,

    /// Frames per second.
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Number of frames to send before the users are lost.
    #[arg(long, default_value = "300")]
    frames: u32,
}

/// 立ち姿勢の基準位置 (正規化座標)
fn rest_position(joint: Joint) -> [f64; 3] {
    match joint {
        Joint::Head => [0.50, 0.15, 2.0],
        Joint::Neck => [0.50, 0.25, 2.0],
        Joint::LeftCollar => [0.47, 0.27, 2.0],
        Joint::RightCollar => [0.53, 0.27, 2.0],
        Joint::LeftShoulder => [0.42, 0.28, 2.0],
        Joint::RightShoulder => [0.58, 0.28, 2.0],
        Joint::LeftElbow => [0.38, 0.40, 2.0],
        Joint::RightElbow => [0.62, 0.40, 2.0],
        Joint::LeftWrist => [0.36, 0.50, 2.0],
        Joint::RightWrist => [0.64, 0.50, 2.0],
        Joint::LeftHand => [0.35, 0.53, 2.0],
        Joint::RightHand => [0.65, 0.53, 2.0],
        Joint::LeftFingertip => [0.35, 0.56, 2.0],
        Joint::RightFingertip => [0.65, 0.56, 2.0],
        Joint::Torso => [0.50, 0.42, 2.0],
        Joint::LeftHip => [0.45, 0.55, 2.0],
        Joint::RightHip => [0.55, 0.55, 2.0],
        Joint::LeftKnee => [0.45, 0.72, 2.0],
        Joint::RightKnee => [0.55, 0.72, 2.0],
        Joint::LeftAnkle => [0.45, 0.88, 2.0],
        Joint::RightAnkle => [0.55, 0.88, 2.0],
        Joint::LeftFoot => [0.45, 0.92, 1.95],
        Joint::RightFoot => [0.55, 0.92, 1.95],
    }
}

/// Y軸回りの回転行列 (行優先)
fn yaw_matrix(yaw: f64) -> [f64; 9] {
    let (s, c) = yaw.sin_cos();
    [c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let sender = SkeletonSender::new(&cli.target)
        .with_context(|| format!("cannot send to {}", cli.target))?;
    tracing::info!("Sending {} user(s) to {} at {} fps", cli.users, cli.target, cli.fps);

    for user in 1..=cli.users {
        sender.send(&SkeletonMessage::NewUser { user })?;
        sender.send(&SkeletonMessage::NewSkeleton { user })?;
    }

    let frame_duration = Duration::from_secs_f64(1.0 / cli.fps.max(1) as f64);
    for frame in 0..cli.frames {
        let frame_start = Instant::now();
        let t = frame as f64 * frame_duration.as_secs_f64();

        for user in 1..=cli.users {
            // ユーザーごとに横へずらし、左右に揺らす
            let offset = (user - 1) as f64 * 0.2 - 0.1 * (cli.users - 1) as f64;
            let sway = 0.03 * (t * 2.0).sin();

            for joint in Joint::ALL {
                let [x, y, z] = rest_position(joint);
                sender.send(&SkeletonMessage::Joint(JointUpdate {
                    label: joint.as_str().to_string(),
                    user,
                    x: x + offset + sway,
                    y,
                    z,
                }))?;
            }
            for joint in [Joint::Head, Joint::Torso] {
                sender.send(&SkeletonMessage::Orientation(OrientationUpdate {
                    label: joint.as_str().to_string(),
                    user,
                    matrix: yaw_matrix(sway * 5.0),
                }))?;
            }
        }

        if frame % cli.fps.max(1) == 0 {
            tracing::info!("frame {}", frame);
        }

        while frame_start.elapsed() < frame_duration {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    for user in 1..=cli.users {
        sender.send(&SkeletonMessage::LostUser { user })?;
    }
    tracing::info!("Done");
    Ok(())
}
