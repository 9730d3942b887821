/// OSCeleton が送信する既知の関節ラベル
///
/// 送信側はここに無いラベル(数値IDなど)も送ってくるため、
/// スケルトン内部ではラベルを文字列として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Head,
    Neck,
    LeftCollar,
    RightCollar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHand,
    RightHand,
    LeftFingertip,
    RightFingertip,
    Torso,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftFoot,
    RightFoot,
}

impl Joint {
    pub const COUNT: usize = 23;

    pub const ALL: [Joint; Self::COUNT] = [
        Self::Head,
        Self::Neck,
        Self::LeftCollar,
        Self::RightCollar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftFingertip,
        Self::RightFingertip,
        Self::Torso,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    /// ワイヤ上のラベル
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Neck => "neck",
            Self::LeftCollar => "l_collar",
            Self::RightCollar => "r_collar",
            Self::LeftShoulder => "l_shoulder",
            Self::RightShoulder => "r_shoulder",
            Self::LeftElbow => "l_elbow",
            Self::RightElbow => "r_elbow",
            Self::LeftWrist => "l_wrist",
            Self::RightWrist => "r_wrist",
            Self::LeftHand => "l_hand",
            Self::RightHand => "r_hand",
            Self::LeftFingertip => "l_fingertip",
            Self::RightFingertip => "r_fingertip",
            Self::Torso => "torso",
            Self::LeftHip => "l_hip",
            Self::RightHip => "r_hip",
            Self::LeftKnee => "l_knee",
            Self::RightKnee => "r_knee",
            Self::LeftAnkle => "l_ankle",
            Self::RightAnkle => "r_ankle",
            Self::LeftFoot => "l_foot",
            Self::RightFoot => "r_foot",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.as_str() == label)
    }
}

impl AsRef<str> for Joint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
