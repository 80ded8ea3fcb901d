//! Uniform random frame drop for fault injection, driven by the
//! `ARSDK_TRANSPORT_NET_RX_DROP_RATIO` / `_TX_DROP_RATIO` environment
//! variables (protocol §6.6). Each is an integer in `[0, 100]`; reading it
//! is cached once at construction since the process environment doesn't
//! change mid-run.

use rand::Rng;

const RX_VAR: &str = "ARSDK_TRANSPORT_NET_RX_DROP_RATIO";
const TX_VAR: &str = "ARSDK_TRANSPORT_NET_TX_DROP_RATIO";

fn read_ratio(var: &str) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .map(|v| v.min(100))
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
pub struct DropRatios {
    rx: u32,
    tx: u32,
}

impl DropRatios {
    pub fn from_env() -> DropRatios {
        DropRatios { rx: read_ratio(RX_VAR), tx: read_ratio(TX_VAR) }
    }

    #[cfg(test)]
    pub fn new(rx: u32, tx: u32) -> DropRatios {
        DropRatios { rx: rx.min(100), tx: tx.min(100) }
    }

    pub fn should_drop_rx(&self) -> bool {
        self.rx > 0 && rand::thread_rng().gen_range(0, 100) < self.rx
    }

    pub fn should_drop_tx(&self) -> bool {
        self.tx > 0 && rand::thread_rng().gen_range(0, 100) < self.tx
    }
}
