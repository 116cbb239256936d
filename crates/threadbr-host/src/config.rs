//! Host configuration file format.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use spinel_protocol::Eui64;
use threadbr_common::{ConnectionState, JoinerRecord, JoinerState, NetworkRecord, NetworkRole};

use crate::HostError;

/// Top-level configuration file.
#[derive(Debug, Deserialize)]
pub struct HostConfig {
    /// TCP endpoint the RCP's serial port is bridged to.
    pub rcp_addr: String,
    /// Network to seed and attach on startup.
    pub network: NetworkConfig,
    /// Joiners to pre-register.
    #[serde(default)]
    pub joiners: Vec<JoinerConfig>,
}

/// Network credentials, as written in the file.
#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// Record identifier.
    pub id: String,
    /// Network name.
    pub name: String,
    /// 802.15.4 channel (11-26).
    pub channel: u8,
    /// 802.15.4 PAN identifier.
    pub pan_id: u16,
    /// Extended PAN identifier, 8 bytes hex encoded.
    pub ext_pan_id: String,
    /// Network master key, 16 bytes hex encoded.
    pub network_key: String,
}

/// A joiner to pre-register on startup.
#[derive(Debug, Deserialize)]
pub struct JoinerConfig {
    /// Record identifier.
    pub id: String,
    /// Joiner EUI-64, 8 bytes hex encoded.
    pub eui64: String,
    /// Pre-shared key for device commissioning.
    pub pskd: String,
    /// Session lifetime in seconds from startup.
    #[serde(default = "default_joiner_lifetime")]
    pub lifetime_secs: u64,
}

fn default_joiner_lifetime() -> u64 {
    300
}

impl HostConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let file = File::open(path)?;
        serde_yaml::from_reader(file).map_err(|source| HostError::Config {
            path: path.display().to_string(),
            source,
        })
    }
}

impl NetworkConfig {
    /// Build the network record this configuration seeds.
    pub fn to_record(&self) -> Result<NetworkRecord, HostError> {
        let ext_pan_id = decode_fixed::<8>("ext_pan_id", &self.ext_pan_id)?;
        let network_key = hex::decode(&self.network_key).map_err(|e| HostError::Field {
            field: "network_key".to_string(),
            reason: e.to_string(),
        })?;
        if network_key.len() != 16 {
            return Err(HostError::Field {
                field: "network_key".to_string(),
                reason: format!("expected 16 bytes, got {}", network_key.len()),
            });
        }
        Ok(NetworkRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            channel: self.channel,
            pan_id: self.pan_id,
            ext_pan_id,
            network_key,
            role: NetworkRole::Detached,
            state: ConnectionState::Detached,
        })
    }
}

impl JoinerConfig {
    /// Build the joiner record this configuration seeds.
    pub fn to_record(
        &self,
        network_id: &str,
        now: DateTime<Utc>,
    ) -> Result<JoinerRecord, HostError> {
        let eui64 = decode_fixed::<8>("eui64", &self.eui64)?;
        Ok(JoinerRecord {
            id: self.id.clone(),
            network_id: network_id.to_string(),
            eui64: Eui64::new(eui64),
            pskd: self.pskd.clone(),
            state: JoinerState::Pending,
            expires_at: now + chrono::Duration::seconds(self.lifetime_secs as i64),
            started_at: None,
            completed_at: None,
        })
    }
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<[u8; N], HostError> {
    let bytes = hex::decode(value).map_err(|e| HostError::Field {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| HostError::Field {
        field: field.to_string(),
        reason: format!("expected {N} bytes, got {len}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
rcp_addr: "127.0.0.1:9600"
network:
  id: net-1
  name: br-main
  channel: 15
  pan_id: 4660
  ext_pan_id: "0102030405060708"
  network_key: "00112233445566778899aabbccddeeff"
joiners:
  - id: j-1
    eui64: "aabbccddeeff0011"
    pskd: J01NME
"#;

    #[test]
    fn test_sample_config_parses() {
        let config: HostConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let network = config.network.to_record().unwrap();
        assert_eq!(network.channel, 15);
        assert_eq!(network.pan_id, 0x1234);
        assert_eq!(network.ext_pan_id, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(network.role, NetworkRole::Detached);

        let now = Utc::now();
        let joiner = config.joiners[0].to_record("net-1", now).unwrap();
        assert_eq!(
            joiner.eui64,
            Eui64::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x11])
        );
        assert_eq!(joiner.state, JoinerState::Pending);
        assert_eq!(joiner.expires_at, now + chrono::Duration::seconds(300));
    }

    #[test]
    fn test_bad_key_length_rejected() {
        let mut config: HostConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.network.network_key = "0011".to_string();
        assert!(matches!(
            config.network.to_record(),
            Err(HostError::Field { .. })
        ));

        config.network.network_key = "zz".repeat(16);
        assert!(matches!(
            config.network.to_record(),
            Err(HostError::Field { .. })
        ));
    }
}
