//! Type-of-service hints applied to the data socket when `qos_mode=1`
//! (protocol §4.3). Values are the standard IP precedence bits; out of
//! scope beyond picking the right byte for the two traffic classes this
//! crate cares about (control vs. video is a stream-muxing concern and a
//! Non-goal, but the constant is kept for parity with the original).

/// `IPTOS_PREC_INTERNETCONTROL`: used for the control (command) socket.
pub const IPTOS_PREC_INTERNETCONTROL: u32 = 0xc0;

/// `IPTOS_PREC_FLASHOVERRIDE`: used for the video socket in the original;
/// kept here since a caller may reuse this transport for a secondary
/// stream, even though video muxing itself is out of scope.
pub const IPTOS_PREC_FLASHOVERRIDE: u32 = 0x60;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum QosMode {
    Disabled,
    Enabled,
}

impl QosMode {
    pub fn from_raw(mode: i32) -> QosMode {
        if mode == 1 {
            QosMode::Enabled
        } else {
            QosMode::Disabled
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            QosMode::Disabled => 0,
            QosMode::Enabled => 1,
        }
    }
}
