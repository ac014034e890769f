use std::io;

use pnet::util::MacAddr;

use crate::wol::{self, WOL_PKT_SIZE};

/// Transport seam for the dispatcher; production wraps a broadcast UDP
/// socket, tests substitute a recording mock.
pub trait WakeSender {
    fn send_wake(&mut self, pkt: &[u8; WOL_PKT_SIZE]) -> io::Result<()>;
}

#[derive(Debug)]
pub struct RemapTable {
    pub trigger: MacAddr,
    pub wake: Vec<MacAddr>,
}

/// Sends one magic packet per remap entry when `target` equals the trigger
/// address and returns the number of packets handed to the sender.
///
/// A failed send is logged and does not abort the remaining entries.
pub fn dispatch<S: WakeSender>(target: MacAddr, table: &RemapTable, sender: &mut S) -> usize {
    if target != table.trigger {
        return 0;
    }

    let mut sent = 0;
    for mac in &table.wake {
        let pkt = wol::build_magic_packet(*mac);
        if let Err(e) = sender.send_wake(&pkt) {
            log::warn!("[relay] failed to send wake packet for {}: {}", mac, e);
        }
        sent += 1;
    }

    sent
}
