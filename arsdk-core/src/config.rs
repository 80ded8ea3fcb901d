//! Runtime configuration (§13): the tunables the protocol calls out as
//! configurable, loadable from TOML via `serdeconv` the way the teacher's
//! `gamerunner`/`flux::logging` configs are.

use arsdk_support::{Error, Result};
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// `v2`'s 1400-byte and `v3`'s 1000-byte pack ceilings are protocol
/// constants baked into `arsdk_cmditf::v2`/`v3`, not runtime knobs in the
/// original implementation either; these two fields exist for
/// documentation/validation (`Config::validate`), not to override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_ip: String,
    pub d2c_port: u16,
    pub c2d_port: u16,
    pub qos_mode: u32,
    pub proto_v_min: u32,
    pub proto_v_max: u32,
    pub net_ping_period_ms: u64,
    pub ack_timeout_ms: u64,
    pub default_max_retry_count: i32,
    pub v2_pack_limit: usize,
    pub v3_pack_limit: usize,
    pub max_partial_cmd_len: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            bind_ip: "0.0.0.0".to_string(),
            d2c_port: 54321,
            c2d_port: 43210,
            qos_mode: 0,
            proto_v_min: 1,
            proto_v_max: 3,
            net_ping_period_ms: 2000,
            ack_timeout_ms: 500,
            default_max_retry_count: 5,
            v2_pack_limit: 1400,
            v3_pack_limit: 1000,
            max_partial_cmd_len: 1 << 20,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Config> {
        serdeconv::from_toml_str(s).map_err(|_| Error::Protocol)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        serdeconv::from_toml_file(path).map_err(|_| Error::Protocol)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        serdeconv::to_toml_string(self).map_err(|_| Error::Protocol)
    }

    /// Catches config files hand-edited to disagree with the wire
    /// constants actually compiled into `arsdk_cmditf`.
    pub fn validate(&self) -> Result<()> {
        if self.v2_pack_limit != 1400 || self.v3_pack_limit != 1000 {
            return Err(Error::InvalidArgument);
        }
        if self.proto_v_min > self.proto_v_max {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = Config::default();
        let toml = config.to_toml_string().unwrap();
        let back = Config::from_toml_str(&toml).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn default_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn mismatched_pack_limit_fails_validation() {
        let mut config = Config::default();
        config.v2_pack_limit = 9999;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_version_range_fails_validation() {
        let mut config = Config::default();
        config.proto_v_min = 3;
        config.proto_v_max = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config = Config::from_toml_str("d2c_port = 9999\n").unwrap();
        assert_eq!(config.d2c_port, 9999);
        assert_eq!(config.ack_timeout_ms, Config::default().ack_timeout_ms);
    }
}
