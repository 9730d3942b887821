use std::collections::HashMap;

use crate::error::{Result, SkeletonError};
use crate::point::Point;

/// 関節の姿勢行列 (3行、各行3成分)
pub type Orientation = [Point; 3];

/// 1ユーザー分の関節位置と姿勢
///
/// `joints` と `orientations` は別々のメッセージから埋まるため、
/// 片方にしか存在しないラベルもありうる。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    pub id: i32,
    pub joints: HashMap<String, Point>,
    pub orientations: HashMap<String, Orientation>,
}

impl Skeleton {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            joints: HashMap::new(),
            orientations: HashMap::new(),
        }
    }

    /// 指定ラベルが全て `joints` に含まれるか (姿勢は見ない)
    pub fn contains_all<I, S>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .all(|label| self.joints.contains_key(label.as_ref()))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.joints.contains_key(label)
    }

    pub fn set_joint(&mut self, label: impl Into<String>, point: Point) {
        self.joints.insert(label.into(), point);
    }

    /// 関節位置を取得。存在しなければ [`SkeletonError::MissingJoint`]
    pub fn joint(&self, label: &str) -> Result<&Point> {
        self.joints.get(label).ok_or_else(|| SkeletonError::MissingJoint {
            user: self.id,
            label: label.to_string(),
        })
    }

    pub fn set_orientation(&mut self, label: impl Into<String>, orientation: Orientation) {
        self.orientations.insert(label.into(), orientation);
    }

    pub fn orientation(&self, label: &str) -> Option<&Orientation> {
        self.orientations.get(label)
    }

    /// 関節位置マップの複製
    pub fn copy_joints(&self) -> HashMap<String, Point> {
        self.joints
            .iter()
            .map(|(label, point)| (label.clone(), *point))
            .collect()
    }

    /// 関節と姿勢を空にする (IDと確保済み領域はそのまま)
    pub fn clear(&mut self) {
        self.joints.clear();
        self.orientations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.orientations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Joint;

    #[test]
    fn test_new_is_empty() {
        let skel = Skeleton::new(3);
        assert_eq!(skel.id, 3);
        assert!(skel.is_empty());
    }

    #[test]
    fn test_contains_all_ignores_orientations() {
        let mut skel = Skeleton::new(1);
        skel.set_joint(Joint::Head.as_str(), Point::new(0.1, 0.2, 0.3));
        skel.set_orientation(Joint::Neck.as_str(), [Point::ZERO; 3]);
        assert!(!skel.contains_all([Joint::Head, Joint::Neck]));

        skel.set_joint(Joint::Neck.as_str(), Point::new(0.1, 0.3, 0.3));
        assert!(skel.contains_all([Joint::Head, Joint::Neck]));
        assert!(skel.contains_all(["head"]));
        assert!(skel.contains_all(Vec::<String>::new()));
    }

    #[test]
    fn test_missing_joint() {
        let skel = Skeleton::new(4);
        match skel.joint("torso") {
            Err(SkeletonError::MissingJoint { user, label }) => {
                assert_eq!(user, 4);
                assert_eq!(label, "torso");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_copy_joints_is_deep() {
        let mut skel = Skeleton::new(1);
        skel.set_joint("head", Point::new(1.0, 2.0, 3.0));
        let copied = skel.copy_joints();
        skel.set_joint("head", Point::new(9.0, 9.0, 9.0));
        assert_eq!(copied["head"], Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_clear_keeps_id() {
        let mut skel = Skeleton::new(7);
        skel.set_joint("head", Point::new(1.0, 2.0, 3.0));
        skel.set_orientation("head", [Point::ZERO; 3]);
        skel.clear();
        assert_eq!(skel.id, 7);
        assert!(skel.is_empty());
    }
}
