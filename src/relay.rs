use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::remap::{self, RemapTable, WakeSender};
use crate::wol::{self, WOL_PKT_SIZE};

struct UdpWakeSender {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl WakeSender for UdpWakeSender {
    fn send_wake(&mut self, pkt: &[u8; WOL_PKT_SIZE]) -> io::Result<()> {
        self.socket.send_to(pkt, self.dest).map(|_| ())
    }
}

enum Recv {
    Datagram(usize, SocketAddr),
    Retry,
}

/// Receive failures are per-datagram diagnostics; the listener keeps
/// running for the lifetime of the process.
fn classify_recv(res: io::Result<(usize, SocketAddr)>) -> Recv {
    match res {
        Ok((len, src)) => Recv::Datagram(len, src),
        Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => Recv::Retry,
        Err(e) => {
            log::error!("[listener] receive failed: {}", e);
            // back off so a persistent socket error does not spin the loop
            std::thread::sleep(Duration::from_millis(50));
            Recv::Retry
        }
    }
}

pub fn relay_worker(cfg: Config, token: CancellationToken) -> Result<JoinHandle<()>> {
    let listen = cfg.listen.unwrap_or_default();

    let socket = UdpSocket::bind((listen.listen_addr, listen.listen_port))
        .with_context(|| format!("unable to bind {}:{}", listen.listen_addr, listen.listen_port))?;
    socket
        .set_broadcast(true)
        .context("unable to enable SO_BROADCAST")?;
    // short timeout so the loop can observe cancellation
    socket
        .set_read_timeout(Some(Duration::from_millis(50)))
        .context("unable to set read timeout")?;

    log::info!("listening on {}:{}", listen.listen_addr, listen.listen_port);

    let table = RemapTable {
        trigger: cfg.trigger,
        wake: cfg.wake,
    };
    let mut sender = UdpWakeSender {
        socket: socket.try_clone().context("unable to clone socket")?,
        dest: SocketAddr::from((cfg.broadcast_addr, cfg.wake_port)),
    };

    let h = std::thread::spawn(move || {
        // datagrams larger than a magic packet are truncated by the kernel
        let mut buf = [0u8; WOL_PKT_SIZE];

        loop {
            if token.is_cancelled() { log::trace!("[listener] exit"); break; }

            let (len, src) = match classify_recv(socket.recv_from(&mut buf)) {
                Recv::Datagram(len, src) => (len, src),
                Recv::Retry => continue,
            };

            let target = match wol::parse_magic_packet(&buf[..len]) {
                Ok(mac) => mac,
                Err(_) => {
                    log::trace!("[listener] {} byte datagram from {} is not magic", len, src);
                    continue;
                }
            };

            log::debug!("[listener] received magic packet for {} from {}", target, src);

            let woken = remap::dispatch(target, &table, &mut sender);
            if woken > 0 {
                log::info!("[relay] trigger {} matched, sent {} wake packets", target, woken);
            }
        }
    });

    Ok(h)
}
