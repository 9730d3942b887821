//! OSCeleton message decoding.
//!
//! Each OSC message is decoded into one strongly-typed [`SkeletonMessage`]
//! before it reaches the aggregator, so handlers never index into raw
//! argument lists.

use rosc::{OscMessage, OscType};

use crate::error::{Result, SkeletonError};

pub const ADDR_NEW_USER: &str = "/new_user";
pub const ADDR_LOST_USER: &str = "/lost_user";
pub const ADDR_NEW_SKELETON: &str = "/new_skel";
pub const ADDR_JOINT: &str = "/joint";
pub const ADDR_ORIENT: &str = "/orient";

/// 関節位置の更新
#[derive(Debug, Clone, PartialEq)]
pub struct JointUpdate {
    pub label: String,
    pub user: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 関節姿勢の更新 (行優先 3x3)
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationUpdate {
    pub label: String,
    pub user: i32,
    pub matrix: [f64; 9],
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkeletonMessage {
    NewUser { user: i32 },
    LostUser { user: i32 },
    /// キャリブレーション完了通知
    NewSkeleton { user: i32 },
    Joint(JointUpdate),
    Orientation(OrientationUpdate),
    /// 未知のアドレス (将来の拡張用に無視する)
    Unrecognized { addr: String },
}

impl SkeletonMessage {
    /// OSCメッセージを解釈する
    ///
    /// 既知アドレスで引数の数や型が合わない場合は
    /// [`SkeletonError::InvalidArguments`]。未知アドレスはエラーにしない。
    pub fn from_osc(msg: &OscMessage) -> Result<Self> {
        let args = Args::new(msg);
        match msg.addr.as_str() {
            ADDR_NEW_USER => {
                args.expect_len(1)?;
                Ok(Self::NewUser { user: args.user(0)? })
            }
            ADDR_LOST_USER => {
                args.expect_len(1)?;
                Ok(Self::LostUser { user: args.user(0)? })
            }
            ADDR_NEW_SKELETON => {
                args.expect_len(1)?;
                Ok(Self::NewSkeleton { user: args.user(0)? })
            }
            ADDR_JOINT => {
                args.expect_len(5)?;
                Ok(Self::Joint(JointUpdate {
                    label: args.label(0)?,
                    user: args.user(1)?,
                    x: args.float(2)?,
                    y: args.float(3)?,
                    z: args.float(4)?,
                }))
            }
            ADDR_ORIENT => {
                args.expect_len(11)?;
                let mut matrix = [0.0; 9];
                for (i, m) in matrix.iter_mut().enumerate() {
                    *m = args.float(2 + i)?;
                }
                Ok(Self::Orientation(OrientationUpdate {
                    label: args.label(0)?,
                    user: args.user(1)?,
                    matrix,
                }))
            }
            other => Ok(Self::Unrecognized {
                addr: other.to_string(),
            }),
        }
    }

    /// OSCeleton 送信側と同じ形式のOSCメッセージを構築
    pub fn to_osc(&self) -> OscMessage {
        let (addr, args) = match self {
            Self::NewUser { user } => (ADDR_NEW_USER.to_string(), vec![OscType::Int(*user)]),
            Self::LostUser { user } => (ADDR_LOST_USER.to_string(), vec![OscType::Int(*user)]),
            Self::NewSkeleton { user } => {
                (ADDR_NEW_SKELETON.to_string(), vec![OscType::Int(*user)])
            }
            Self::Joint(j) => (
                ADDR_JOINT.to_string(),
                vec![
                    OscType::String(j.label.clone()),
                    OscType::Int(j.user),
                    OscType::Float(j.x as f32),
                    OscType::Float(j.y as f32),
                    OscType::Float(j.z as f32),
                ],
            ),
            Self::Orientation(o) => {
                let mut args = Vec::with_capacity(11);
                args.push(OscType::String(o.label.clone()));
                args.push(OscType::Int(o.user));
                args.extend(o.matrix.iter().map(|m| OscType::Float(*m as f32)));
                (ADDR_ORIENT.to_string(), args)
            }
            Self::Unrecognized { addr } => (addr.clone(), Vec::new()),
        };
        OscMessage { addr, args }
    }
}

/// 位置引数のアクセサ
struct Args<'a> {
    addr: &'a str,
    args: &'a [OscType],
}

impl<'a> Args<'a> {
    fn new(msg: &'a OscMessage) -> Self {
        Self {
            addr: &msg.addr,
            args: &msg.args,
        }
    }

    fn invalid(&self, reason: String) -> SkeletonError {
        SkeletonError::InvalidArguments {
            addr: self.addr.to_string(),
            reason,
        }
    }

    fn expect_len(&self, expected: usize) -> Result<()> {
        if self.args.len() != expected {
            return Err(self.invalid(format!(
                "expected {} arguments, got {}",
                expected,
                self.args.len()
            )));
        }
        Ok(())
    }

    fn user(&self, index: usize) -> Result<i32> {
        match &self.args[index] {
            OscType::Int(v) => Ok(*v),
            OscType::Long(v) => i32::try_from(*v)
                .map_err(|_| self.invalid(format!("user id {} out of range", v))),
            other => Err(self.invalid(format!("argument {} must be an integer user id, got {:?}", index, other))),
        }
    }

    /// 関節ラベルは文字列でも数値でもよい
    fn label(&self, index: usize) -> Result<String> {
        match &self.args[index] {
            OscType::String(s) => Ok(s.clone()),
            OscType::Int(v) => Ok(v.to_string()),
            OscType::Long(v) => Ok(v.to_string()),
            other => Err(self.invalid(format!("argument {} must be a joint label, got {:?}", index, other))),
        }
    }

    fn float(&self, index: usize) -> Result<f64> {
        match &self.args[index] {
            OscType::Float(v) => Ok(*v as f64),
            OscType::Double(v) => Ok(*v),
            OscType::Int(v) => Ok(*v as f64),
            OscType::Long(v) => Ok(*v as f64),
            other => Err(self.invalid(format!("argument {} must be numeric, got {:?}", index, other))),
        }
    }
}
