use anyhow::Result;
use rosc::{encoder, OscMessage, OscPacket};
use std::net::UdpSocket;

use crate::config::DEFAULT_PORT;
use crate::message::SkeletonMessage;

/// OSCメッセージをバイト列にエンコード
pub fn encode_osc_message(msg: &OscMessage) -> Result<Vec<u8>> {
    let packet = OscPacket::Message(msg.clone());
    let encoded = encoder::encode(&packet)?;
    Ok(encoded)
}

/// OSCeleton と同じ形式でスケルトンメッセージを送るクライアント
pub struct SkeletonSender {
    socket: UdpSocket,
    target_addr: String,
}

impl SkeletonSender {
    pub fn new(target_addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target_addr: target_addr.to_string(),
        })
    }

    /// 127.0.0.1 のデフォルトポート宛て
    pub fn localhost() -> Result<Self> {
        Self::new(&format!("127.0.0.1:{}", DEFAULT_PORT))
    }

    pub fn target_addr(&self) -> &str {
        &self.target_addr
    }

    pub fn send(&self, message: &SkeletonMessage) -> Result<()> {
        let data = encode_osc_message(&message.to_osc())?;
        self.socket.send_to(&data, &self.target_addr)?;
        Ok(())
    }
}
