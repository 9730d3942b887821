//! Error types for the skeleton receiver.

use thiserror::Error;

/// スケルトン受信処理で発生するエラー
#[derive(Debug, Error)]
pub enum SkeletonError {
    /// 要求された関節がスケルトンに存在しない
    #[error("joint '{label}' is missing from skeleton of user {user}")]
    MissingJoint { user: i32, label: String },

    /// 長さ0のベクトルは正規化できない
    #[error("cannot normalize a zero-length point")]
    DegenerateNormalize,

    /// 既知のアドレスだが引数の数・型が不正
    #[error("invalid arguments for {addr}: {reason}")]
    InvalidArguments { addr: String, reason: String },

    /// ソケットI/Oエラー
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// OSCパケットのデコード失敗
    #[error("failed to decode OSC packet: {0:?}")]
    Decode(rosc::OscError),
}

impl From<rosc::OscError> for SkeletonError {
    fn from(err: rosc::OscError) -> Self {
        Self::Decode(err)
    }
}

pub type Result<T> = std::result::Result<T, SkeletonError>;
