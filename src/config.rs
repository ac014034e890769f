use std::net::{IpAddr, Ipv4Addr};

use pnet::util::MacAddr;
use serde::{Deserialize, Deserializer};

/// Deserializes an absent field as None and an unset field as T::default.
///
/// This avoids having Option<Option<T>> as in serde_with::rust::double_option
pub fn deserialize_absent_or_null<'de, D, T: Default>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.or(Some(T::default())))
}

fn deserialize_mac<'de, D>(deserializer: D) -> Result<MacAddr, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn deserialize_mac_list<'de, D>(deserializer: D) -> Result<Vec<MacAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .collect()
}

fn default_broadcast_addr() -> Ipv4Addr {
    Ipv4Addr::BROADCAST
}

fn default_wake_port() -> u16 {
    9
}

#[derive(Debug, Deserialize)]
pub struct ListenConfig {
    pub listen_addr: IpAddr,
    pub listen_port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen_addr: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            listen_port: 9,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_absent_or_null")]
    pub listen: Option<ListenConfig>,

    /// Target address of incoming magic packets that triggers the remap table
    #[serde(deserialize_with = "deserialize_mac")]
    pub trigger: MacAddr,

    /// Addresses woken when the trigger matches, in send order
    #[serde(deserialize_with = "deserialize_mac_list")]
    pub wake: Vec<MacAddr>,

    #[serde(default = "default_broadcast_addr")]
    pub broadcast_addr: Ipv4Addr,

    #[serde(default = "default_wake_port")]
    pub wake_port: u16,
}
