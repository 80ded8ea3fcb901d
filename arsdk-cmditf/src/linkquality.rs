//! Per-interface link-quality accounting (protocol §5 "Timeouts",
//! §14 supplemented feature): a 5000ms periodic timer samples tx/rx packet
//! counters, derives quality percentages, and resets the counters.

use crate::status::LinkQuality;

pub const LINK_QUALITY_PERIOD_MS: u64 = 5000;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkQualityCounters {
    tx_count: u32,
    tx_ack_count: u32,
    rx_count: u32,
    rx_ack_count: u32,
}

impl LinkQualityCounters {
    pub fn new() -> LinkQualityCounters {
        LinkQualityCounters::default()
    }

    pub fn record_tx(&mut self) {
        self.tx_count += 1;
    }

    pub fn record_tx_ack(&mut self) {
        self.tx_ack_count += 1;
    }

    pub fn record_rx(&mut self) {
        self.rx_count += 1;
    }

    pub fn record_rx_ack(&mut self) {
        self.rx_ack_count += 1;
    }

    /// Computes `{tx,rx}_quality` as a 0..=100 percentage (div-by-zero
    /// guarded to 100, meaning "no traffic, nothing to complain about") and
    /// resets the counters for the next period, mirroring
    /// `arsdk_transport_link_quality_cb`.
    pub fn sample_and_reset(&mut self) -> LinkQuality {
        let quality = LinkQuality {
            tx_quality: percentage(self.tx_ack_count, self.tx_count),
            rx_quality: percentage(self.rx_ack_count, self.rx_count),
        };
        *self = LinkQualityCounters::default();
        quality
    }
}

fn percentage(numerator: u32, denominator: u32) -> u8 {
    if denominator == 0 {
        100
    } else {
        (100u64.min((numerator as u64 * 100) / denominator as u64)) as u8
    }
}
