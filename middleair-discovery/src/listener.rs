//! Listener: binds one multicast UDP receiver, fans datagrams through a
//! single channel to a serializing consumer (§4.3 "Listener").

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::announcement::Announcement;
use crate::callbacks::CallbackRegistry;
use crate::directory::RemoteDirectory;

/// §4.3 "buffer ≥8 KiB"; matches the §6 8192-byte datagram cap.
pub const RECV_BUFFER: usize = 8192;

/// Bind a UDP socket and join the IPv4 multicast group `224.0.0.57` on
/// `port` (§6 "Wire — announcement").
pub async fn bind_multicast_v4(port: u16) -> Result<UdpSocket, std::io::Error> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
    socket.join_multicast_v4(Ipv4Addr::new(224, 0, 0, 57), Ipv4Addr::UNSPECIFIED)?;
    Ok(socket)
}

/// Receive one datagram and decode it, observing the source IP as the
/// authoritative `provider.host` (§4.3) rather than trusting the payload.
fn decode_datagram(buf: &[u8], source: SocketAddr) -> Result<Announcement, String> {
    Announcement::decode(buf).map_err(|e| format!("decoding announcement from {source}: {e}"))
}

/// One receive-and-fan-out pass: read one datagram, parse it, insert or
/// refresh the remote directory, and invoke every callback.
pub async fn recv_once(
    socket: &UdpSocket,
    directory: &RemoteDirectory,
    callbacks: &CallbackRegistry,
) -> Result<(), String> {
    let mut buf = [0u8; RECV_BUFFER];
    let (n, source) = socket.recv_from(&mut buf).await.map_err(|e| e.to_string())?;
    let announcement = decode_datagram(&buf[..n], source)?;

    callbacks.notify(source, &announcement).await;

    let descriptor = announcement.into_descriptor(source.ip().to_string());
    directory.observe(descriptor).await;
    Ok(())
}

/// Supervised listener loop: receive forever. Runs under
/// [`crate::supervisor::spawn_supervised`].
pub async fn run(
    socket: Arc<UdpSocket>,
    directory: Arc<RemoteDirectory>,
    callbacks: Arc<CallbackRegistry>,
) -> Result<(), String> {
    loop {
        recv_once(&socket, &directory, &callbacks).await?;
    }
}

/// A channel-based fan-in variant: spawns a dedicated receive task per
/// socket and serializes processing of all of them through one consumer,
/// matching "fans received datagrams through a single channel to a
/// serializing consumer" for deployments with more than one bound socket
/// (IPv4 + IPv6).
pub fn fan_in(sockets: Vec<Arc<UdpSocket>>) -> mpsc::Receiver<(Vec<u8>, SocketAddr)> {
    let (tx, rx) = mpsc::channel(64);
    for socket in sockets {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut buf = [0u8; RECV_BUFFER];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((n, source)) => {
                        if tx.send((buf[..n].to_vec(), source)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "multicast receive failed");
                        return;
                    }
                }
            }
        });
    }
    rx
}
