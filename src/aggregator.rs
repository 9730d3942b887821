use std::collections::HashMap;

use rosc::OscMessage;
use tracing::{debug, info};

use crate::coords::{CoordinateMode, CoordinateTransform};
use crate::error::Result;
use crate::message::{JointUpdate, OrientationUpdate, SkeletonMessage};
use crate::point::Point;
use crate::skeleton::Skeleton;

/// ユーザーごとのスケルトンを組み立てる
///
/// 受信中のフレームは `in_progress` に溜め、同じ関節が2回目に届いた時点で
/// フレーム境界とみなして `completed` に移す。`completed` はユーザーごとに
/// 最新1フレームのみ保持し、消費前に次が完成すると上書きされる。
///
/// 関節が毎フレーム同じ順で欠けずに届くことを前提にしている。
/// 送信側がある関節を落とすと、そのサイクルでは境界が検出されない。
#[derive(Debug, Default)]
pub struct SkeletonAggregator {
    in_progress: HashMap<i32, Skeleton>,
    completed: HashMap<i32, Skeleton>,
    lost_users: Vec<i32>,
    frames: u64,
    transform: CoordinateTransform,
}

impl SkeletonAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: CoordinateTransform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    pub fn coordinate_mode(&self) -> CoordinateMode {
        self.transform.mode
    }

    /// 以降に届く関節から適用される
    pub fn set_coordinate_mode(&mut self, mode: CoordinateMode) {
        self.transform.mode = mode;
    }

    /// 完成したフレームの累計 (全ユーザー合算)
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// ロストしたユーザーIDの履歴
    pub fn lost_users(&self) -> &[i32] {
        &self.lost_users
    }

    /// 組み立て中のスケルトン
    pub fn in_progress(&self, user: i32) -> Option<&Skeleton> {
        self.in_progress.get(&user)
    }

    /// OSCメッセージを解釈してハンドラに振り分ける
    pub fn handle_osc(&mut self, msg: &OscMessage) -> Result<()> {
        let message = SkeletonMessage::from_osc(msg)?;
        self.dispatch(message);
        Ok(())
    }

    pub fn dispatch(&mut self, message: SkeletonMessage) {
        match message {
            SkeletonMessage::NewUser { user } => self.on_new_user(user),
            SkeletonMessage::LostUser { user } => self.on_lost_user(user),
            SkeletonMessage::NewSkeleton { user } => self.on_new_skeleton(user),
            SkeletonMessage::Joint(update) => self.on_joint(update),
            SkeletonMessage::Orientation(update) => self.on_orientation(update),
            SkeletonMessage::Unrecognized { addr } => self.on_unrecognized(&addr),
        }
    }

    pub fn on_new_user(&mut self, user: i32) {
        info!("New user {}", user);
        self.in_progress
            .entry(user)
            .or_insert_with(|| Skeleton::new(user));
    }

    /// 未登録ユーザーでもエラーにはしない
    pub fn on_lost_user(&mut self, user: i32) {
        info!("User {} has been lost", user);
        let was_tracked = self.in_progress.remove(&user).is_some();
        let had_pending = self.completed.remove(&user).is_some();
        if !was_tracked && !had_pending {
            debug!("lost_user for untracked user {}", user);
        }
        self.lost_users.push(user);
    }

    pub fn on_new_skeleton(&mut self, user: i32) {
        info!("Calibration complete, now tracking user {}", user);
    }

    pub fn on_joint(&mut self, update: JointUpdate) {
        let JointUpdate { label, user, x, y, z } = update;
        let skeleton = self
            .in_progress
            .entry(user)
            .or_insert_with(|| Skeleton::new(user));

        // 同じ関節が再び来たら前フレームは完成
        if skeleton.contains(&label) {
            let finished = Skeleton {
                id: user,
                joints: skeleton.copy_joints(),
                orientations: skeleton.orientations.clone(),
            };
            skeleton.clear();
            if self.completed.insert(user, finished).is_some() {
                debug!("user {}: unconsumed frame overwritten", user);
            }
            self.frames += 1;
            debug!("user {}: frame {} complete", user, self.frames);
        }

        let point = self.transform.apply(x, y, z);
        skeleton.set_joint(label, point);
    }

    /// 姿勢はフレーム境界の判定に使わない
    pub fn on_orientation(&mut self, update: OrientationUpdate) {
        let OrientationUpdate { label, user, matrix: m } = update;
        let rows = [
            Point::new(m[0], m[1], m[2]),
            Point::new(m[3], m[4], m[5]),
            Point::new(m[6], m[7], m[8]),
        ];
        self.in_progress
            .entry(user)
            .or_insert_with(|| Skeleton::new(user))
            .set_orientation(label, rows);
    }

    pub fn on_unrecognized(&mut self, addr: &str) {
        debug!("ignoring message for {}", addr);
    }

    /// 現在トラッキング中のユーザーID (順不同)
    pub fn users(&self) -> Vec<i32> {
        self.in_progress.keys().copied().collect()
    }

    /// 未消費の完成フレームを全て取り出す。同じフレームは二度返さない
    pub fn drain_new_skeletons(&mut self) -> Vec<Skeleton> {
        self.completed.drain().map(|(_, skel)| skel).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::OscType;

    fn joint(label: &str, user: i32, x: f64, y: f64, z: f64) -> SkeletonMessage {
        SkeletonMessage::Joint(JointUpdate {
            label: label.to_string(),
            user,
            x,
            y,
            z,
        })
    }

    #[test]
    fn test_joint_autocreates_user() {
        let mut agg = SkeletonAggregator::new();
        agg.dispatch(joint("head", 3, 0.1, 0.2, 0.3));
        assert_eq!(agg.users(), vec![3]);
        let skel = agg.in_progress(3).unwrap();
        assert_eq!(*skel.joint("head").unwrap(), Point::new(0.1, 0.2, 0.3));
        assert_eq!(agg.frames(), 0);
    }

    #[test]
    fn test_duplicate_joint_promotes_first_values() {
        let mut agg = SkeletonAggregator::new();
        agg.dispatch(joint("head", 1, 0.1, 0.2, 0.3));
        agg.dispatch(joint("head", 1, 0.4, 0.5, 0.6));
        assert_eq!(agg.frames(), 1);

        let skels = agg.drain_new_skeletons();
        assert_eq!(skels.len(), 1);
        assert_eq!(skels[0].id, 1);
        assert_eq!(*skels[0].joint("head").unwrap(), Point::new(0.1, 0.2, 0.3));

        // 2回目の値は新しいフレームの最初の関節になる
        let current = agg.in_progress(1).unwrap();
        assert_eq!(current.joints.len(), 1);
        assert_eq!(*current.joint("head").unwrap(), Point::new(0.4, 0.5, 0.6));
    }

    #[test]
    fn test_full_frame_cycle() {
        let mut agg = SkeletonAggregator::new();
        for frame in 0..3 {
            let v = frame as f64;
            agg.dispatch(joint("head", 1, v, v, v));
            agg.dispatch(joint("neck", 1, v, v + 1.0, v));
            agg.dispatch(joint("torso", 1, v, v + 2.0, v));
        }
        assert_eq!(agg.frames(), 2);

        // 未消費のフレームは上書きされ最新のみ残る
        let skels = agg.drain_new_skeletons();
        assert_eq!(skels.len(), 1);
        assert!(skels[0].contains_all(["head", "neck", "torso"]));
        assert_eq!(skels[0].joint("neck").unwrap().y, 2.0);
    }

    #[test]
    fn test_drain_is_exhaustive() {
        let mut agg = SkeletonAggregator::new();
        assert!(agg.drain_new_skeletons().is_empty());

        agg.dispatch(joint("head", 1, 0.0, 0.0, 0.0));
        agg.dispatch(joint("head", 2, 0.0, 0.0, 0.0));
        agg.dispatch(joint("head", 1, 1.0, 0.0, 0.0));
        agg.dispatch(joint("head", 2, 1.0, 0.0, 0.0));

        let mut ids: Vec<i32> = agg.drain_new_skeletons().iter().map(|s| s.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(agg.frames(), 2);
        assert!(agg.drain_new_skeletons().is_empty());
    }

    #[test]
    fn test_orientation_does_not_promote() {
        let mut agg = SkeletonAggregator::new();
        let orient = |user| {
            SkeletonMessage::Orientation(OrientationUpdate {
                label: "head".into(),
                user,
                matrix: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            })
        };
        agg.dispatch(orient(6));
        agg.dispatch(orient(6));
        assert_eq!(agg.frames(), 0);
        assert_eq!(agg.users(), vec![6]);

        let skel = agg.in_progress(6).unwrap();
        let rows = skel.orientation("head").unwrap();
        assert_eq!(rows[1], Point::new(0.0, 1.0, 0.0));
        assert!(skel.joints.is_empty());
    }

    #[test]
    fn test_promotion_carries_orientations() {
        let mut agg = SkeletonAggregator::new();
        agg.dispatch(joint("head", 1, 0.0, 0.0, 0.0));
        agg.dispatch(SkeletonMessage::Orientation(OrientationUpdate {
            label: "head".into(),
            user: 1,
            matrix: [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        }));
        agg.dispatch(joint("head", 1, 1.0, 0.0, 0.0));

        let skels = agg.drain_new_skeletons();
        assert_eq!(skels[0].orientation("head").unwrap()[2], Point::new(6.0, 7.0, 8.0));
        assert!(agg.in_progress(1).unwrap().orientations.is_empty());
    }

    #[test]
    fn test_lost_user_resets_state() {
        let mut agg = SkeletonAggregator::new();
        agg.dispatch(SkeletonMessage::NewUser { user: 5 });
        agg.dispatch(joint("head", 5, 0.1, 0.1, 0.1));
        agg.dispatch(joint("neck", 5, 0.1, 0.1, 0.1));
        agg.dispatch(joint("head", 5, 0.2, 0.2, 0.2));
        agg.dispatch(SkeletonMessage::LostUser { user: 5 });

        assert!(agg.users().is_empty());
        assert!(agg.drain_new_skeletons().is_empty());
        assert_eq!(agg.lost_users(), &[5]);

        agg.dispatch(joint("torso", 5, 0.3, 0.3, 0.3));
        let skel = agg.in_progress(5).unwrap();
        assert_eq!(skel.joints.len(), 1);
        assert!(skel.contains("torso"));
        assert!(!skel.contains("head"));
    }

    #[test]
    fn test_lost_unknown_user_tolerated() {
        let mut agg = SkeletonAggregator::new();
        agg.dispatch(SkeletonMessage::LostUser { user: 42 });
        assert_eq!(agg.lost_users(), &[42]);
        assert!(agg.users().is_empty());
    }

    #[test]
    fn test_new_user_idempotent() {
        let mut agg = SkeletonAggregator::new();
        agg.dispatch(joint("head", 2, 0.1, 0.1, 0.1));
        agg.dispatch(SkeletonMessage::NewUser { user: 2 });
        assert!(agg.in_progress(2).unwrap().contains("head"));
        agg.dispatch(SkeletonMessage::NewSkeleton { user: 2 });
        assert_eq!(agg.users(), vec![2]);
    }

    #[test]
    fn test_physical_mode() {
        let mut agg = SkeletonAggregator::new();
        assert_eq!(agg.coordinate_mode(), CoordinateMode::Normalized);
        agg.set_coordinate_mode(CoordinateMode::PhysicalMillimeters);
        agg.dispatch(joint("head", 1, 0.5, 0.5, 0.5));
        let skel = agg.in_progress(1).unwrap();
        assert_eq!(*skel.joint("head").unwrap(), Point::new(0.0, 0.0, -640.0));
    }

    #[test]
    fn test_handle_osc() {
        let mut agg = SkeletonAggregator::new();
        let msg = OscMessage {
            addr: "/joint".into(),
            args: vec![
                OscType::Int(1),
                OscType::Int(9),
                OscType::Float(0.5),
                OscType::Float(0.5),
                OscType::Float(0.5),
            ],
        };
        agg.handle_osc(&msg).unwrap();
        assert!(agg.in_progress(9).unwrap().contains("1"));

        let unknown = OscMessage {
            addr: "/something_else".into(),
            args: vec![OscType::Int(1)],
        };
        agg.handle_osc(&unknown).unwrap();

        let bad = OscMessage {
            addr: "/joint".into(),
            args: vec![OscType::Int(1)],
        };
        assert!(agg.handle_osc(&bad).is_err());
        assert_eq!(agg.users(), vec![9]);
    }
}
