//! UDP transport for OSCeleton messages.
//!
//! [`OscReceiver`] owns the socket and decodes datagrams, [`SkeletonServer`]
//! feeds them to a [`SkeletonAggregator`] on the caller's thread, and
//! [`ThreadedReceiver`] runs the same loop on a background thread with the
//! aggregator behind a mutex.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rosc::{decoder, OscMessage, OscPacket};
use tracing::{debug, info, warn};

use crate::aggregator::SkeletonAggregator;
use crate::config::Config;
use crate::coords::{CoordinateMode, CoordinateTransform};
use crate::error::{Result, SkeletonError};
use crate::skeleton::Skeleton;

/// OSCメッセージを受信するUDPソケット
pub struct OscReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl OscReceiver {
    pub fn bind(addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        info!("Listening for OSC on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            buf: vec![0u8; decoder::MTU],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// 受信待ちのタイムアウト。None で無期限にブロック
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout)?;
        Ok(())
    }

    /// 1データグラムを受信してデコードする (バンドルは展開)
    pub fn recv_messages(&mut self) -> Result<Vec<OscMessage>> {
        let (n, src) = self.socket.recv_from(&mut self.buf)?;
        let (_, packet) = decoder::decode_udp(&self.buf[..n])?;
        let mut messages = Vec::new();
        flatten_packet(packet, &mut messages);
        debug!("{} bytes from {}: {} message(s)", n, src, messages.len());
        Ok(messages)
    }
}

fn flatten_packet(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten_packet(inner, out);
            }
        }
    }
}

/// 受信タイムアウトによるエラーか
pub fn is_timeout(err: &SkeletonError) -> bool {
    matches!(
        err,
        SkeletonError::Transport(e)
            if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut
    )
}

/// 呼び出し側のスレッドで受信と集約を行う
pub struct SkeletonServer {
    receiver: OscReceiver,
    aggregator: SkeletonAggregator,
}

impl SkeletonServer {
    pub fn new(receiver: OscReceiver, aggregator: SkeletonAggregator) -> Self {
        Self { receiver, aggregator }
    }

    /// 設定のアドレスで待ち受ける
    pub fn bind(config: &Config) -> Result<Self> {
        let receiver = OscReceiver::bind(&config.server.listen_addr())?;
        let aggregator =
            SkeletonAggregator::with_transform(CoordinateTransform::from_config(&config.coordinates));
        Ok(Self::new(receiver, aggregator))
    }

    pub fn receiver(&self) -> &OscReceiver {
        &self.receiver
    }

    pub fn aggregator(&self) -> &SkeletonAggregator {
        &self.aggregator
    }

    pub fn aggregator_mut(&mut self) -> &mut SkeletonAggregator {
        &mut self.aggregator
    }

    /// 1パケット受信するまでブロックし、含まれる全メッセージを振り分ける
    ///
    /// 不正なメッセージがあっても残りは処理し、最初のエラーを返す。
    pub fn process_one_event(&mut self) -> Result<usize> {
        let messages = self.receiver.recv_messages()?;
        route_messages(&mut self.aggregator, &messages)
    }

    pub fn users(&self) -> Vec<i32> {
        self.aggregator.users()
    }

    pub fn drain_new_skeletons(&mut self) -> Vec<Skeleton> {
        self.aggregator.drain_new_skeletons()
    }
}

fn route_messages(aggregator: &mut SkeletonAggregator, messages: &[OscMessage]) -> Result<usize> {
    let mut first_error = None;
    let mut routed = 0;
    for msg in messages {
        match aggregator.handle_osc(msg) {
            Ok(()) => routed += 1,
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(routed),
    }
}

/// 別スレッドで受信を行い、完成したスケルトンを提供する
pub struct ThreadedReceiver {
    aggregator: Arc<Mutex<SkeletonAggregator>>,
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
    handle: Option<thread::JoinHandle<()>>,
}

impl ThreadedReceiver {
    pub fn start(config: &Config) -> Result<Self> {
        let receiver = OscReceiver::bind(&config.server.listen_addr())?;
        let aggregator =
            SkeletonAggregator::with_transform(CoordinateTransform::from_config(&config.coordinates));
        Self::spawn(
            receiver,
            aggregator,
            Duration::from_millis(config.server.read_timeout_ms.max(1)),
        )
    }

    pub fn spawn(
        mut receiver: OscReceiver,
        aggregator: SkeletonAggregator,
        poll_interval: Duration,
    ) -> Result<Self> {
        receiver.set_read_timeout(Some(poll_interval))?;
        let local_addr = receiver.local_addr()?;
        let aggregator = Arc::new(Mutex::new(aggregator));
        let aggregator_ref = aggregator.clone();
        let running = Arc::new(AtomicBool::new(true));
        let running_ref = running.clone();

        let handle = thread::spawn(move || {
            while running_ref.load(Ordering::Acquire) {
                // ロックは受信後に取る
                let result = receiver.recv_messages().and_then(|messages| {
                    let mut agg = aggregator_ref.lock().unwrap();
                    route_messages(&mut agg, &messages)
                });
                match result {
                    Ok(_) => {}
                    Err(e) if is_timeout(&e) => {}
                    Err(e) => warn!("dropping OSC packet: {}", e),
                }
            }
            debug!("receiver thread stopped");
        });

        Ok(Self {
            aggregator,
            running,
            local_addr,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn users(&self) -> Vec<i32> {
        self.aggregator.lock().unwrap().users()
    }

    pub fn drain_new_skeletons(&self) -> Vec<Skeleton> {
        self.aggregator.lock().unwrap().drain_new_skeletons()
    }

    pub fn frames(&self) -> u64 {
        self.aggregator.lock().unwrap().frames()
    }

    pub fn lost_users(&self) -> Vec<i32> {
        self.aggregator.lock().unwrap().lost_users().to_vec()
    }

    pub fn set_coordinate_mode(&self, mode: CoordinateMode) {
        self.aggregator.lock().unwrap().set_coordinate_mode(mode);
    }

    /// 受信スレッドを止めて合流する。最大で受信タイムアウト1回分待つ
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("receiver thread panicked");
            }
        }
    }
}

impl Drop for ThreadedReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}
