//! Transport id allocation (see protocol §6.3). Modeled as an explicit enum
//! with a `const fn` ackoff helper instead of bare integers, mirroring the
//! named `#define`s in the original `arsdk_transport_ids.h`.

/// Fixed offset added to a data-plane id to get its ACK id.
pub const ACKOFF: u8 = 128;

pub const ID_PING: u8 = 0;
pub const ID_PONG: u8 = 1;

pub const ID_C2D_NOACK: u8 = 10;
pub const ID_C2D_WITHACK: u8 = 11;
pub const ID_C2D_HIGHPRIO: u8 = 12;

pub const ID_D2C_LOWPRIO: u8 = 125;
pub const ID_D2C_WITHACK: u8 = 126;
pub const ID_D2C_NOACK: u8 = 127;

/// Named transport ids. `Data(id)` covers the queue-carrying ids
/// `[10..=127]` (c2d `[10..=12]`, d2c `[125..=127]`) that aren't otherwise
/// named; `Ack(id)` covers `[138..=255]`, the ack-id space.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransportId {
    Ping,
    Pong,
    Data(u8),
    Ack(u8),
}

impl TransportId {
    pub fn from_raw(id: u8) -> TransportId {
        match id {
            ID_PING => TransportId::Ping,
            ID_PONG => TransportId::Pong,
            id if id >= ACKOFF => TransportId::Ack(id - ACKOFF),
            id => TransportId::Data(id),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            TransportId::Ping => ID_PING,
            TransportId::Pong => ID_PONG,
            TransportId::Data(id) => id,
            TransportId::Ack(id) => id + ACKOFF,
        }
    }
}

/// The ACK id for a data-plane transport id: `id + ACKOFF`.
#[inline]
pub const fn ack_id(id: u8) -> u8 {
    id.wrapping_add(ACKOFF)
}

/// The data-plane transport id a received ACK on `id` refers to: `id - ACKOFF`.
#[inline]
pub const fn tx_queue_id(ack_id: u8) -> u8 {
    ack_id.wrapping_sub(ACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ackoff_round_trips() {
        assert_eq!(ack_id(ID_D2C_WITHACK), 254);
        assert_eq!(tx_queue_id(254), ID_D2C_WITHACK);
    }
}
