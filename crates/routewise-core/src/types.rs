use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Compact channel identifier: funding block height, transaction index and
/// output index packed into 24/24/16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortChannelId(pub u64);

impl ShortChannelId {
    /// Build an id from its components. Components wider than their field
    /// are rejected.
    pub fn from_parts(block: u32, tx_index: u32, output: u16) -> Result<Self, CoreError> {
        if block >= 1 << 24 || tx_index >= 1 << 24 {
            return Err(CoreError::InvalidShortChannelId(format!(
                "{}x{}x{}",
                block, tx_index, output
            )));
        }
        Ok(Self(
            ((block as u64) << 40) | ((tx_index as u64) << 16) | output as u64,
        ))
    }

    pub fn block(&self) -> u32 {
        (self.0 >> 40) as u32
    }

    pub fn tx_index(&self) -> u32 {
        ((self.0 >> 16) & 0xFF_FFFF) as u32
    }

    pub fn output(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.block(), self.tx_index(), self.output())
    }
}

impl FromStr for ShortChannelId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidShortChannelId(s.to_string());
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let block = parts[0].parse::<u32>().map_err(|_| invalid())?;
        let tx_index = parts[1].parse::<u32>().map_err(|_| invalid())?;
        let output = parts[2].parse::<u16>().map_err(|_| invalid())?;
        Self::from_parts(block, tx_index, output).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ShortChannelId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShortChannelId> for String {
    fn from(scid: ShortChannelId) -> Self {
        scid.to_string()
    }
}

/// One direction of one channel. Direction 0 runs from the lesser node id to
/// the greater one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawChannelDirection")]
pub struct ChannelDirection {
    pub scid: ShortChannelId,
    direction: u8,
}

impl ChannelDirection {
    /// Create a channel direction, rejecting anything but 0 or 1.
    pub fn new(scid: ShortChannelId, direction: u32) -> Result<Self, CoreError> {
        match direction {
            0 | 1 => Ok(Self {
                scid,
                direction: direction as u8,
            }),
            other => Err(CoreError::InvalidDirection(other)),
        }
    }

    /// The direction of a channel travelled from `source` to `destination`.
    pub fn between(scid: ShortChannelId, source: &NodeId, destination: &NodeId) -> Self {
        Self {
            scid,
            direction: if source < destination { 0 } else { 1 },
        }
    }

    pub fn direction(&self) -> u8 {
        self.direction
    }

    /// The same channel travelled the other way.
    pub fn reverse(&self) -> Self {
        Self {
            scid: self.scid,
            direction: self.direction ^ 1,
        }
    }
}

#[derive(Deserialize)]
struct RawChannelDirection {
    scid: ShortChannelId,
    direction: u32,
}

impl TryFrom<RawChannelDirection> for ChannelDirection {
    type Error = CoreError;

    fn try_from(raw: RawChannelDirection) -> Result<Self, Self::Error> {
        Self::new(raw.scid, raw.direction)
    }
}

impl fmt::Display for ChannelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scid, self.direction)
    }
}

/// A 33-byte compressed public key identifying a network node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId([u8; 33]);

impl NodeId {
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CoreError> {
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(CoreError::InvalidNodeId(hex::encode(bytes)));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

impl FromStr for NodeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidNodeId(format!("{}: {}", s, e)))?;
        let bytes: [u8; 33] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidNodeId(format!("{}: expected 33 bytes", s)))?;
        Self::from_bytes(bytes)
    }
}

impl TryFrom<String> for NodeId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(node: NodeId) -> Self {
        node.to_string()
    }
}

/// An amount in millisatoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountMsat(pub u64);

impl AmountMsat {
    pub const ZERO: AmountMsat = AmountMsat(0);
    pub const MAX: AmountMsat = AmountMsat(u64::MAX);

    pub fn checked_add(self, other: AmountMsat) -> Option<AmountMsat> {
        self.0.checked_add(other.0).map(AmountMsat)
    }

    pub fn checked_sub(self, other: AmountMsat) -> Option<AmountMsat> {
        self.0.checked_sub(other.0).map(AmountMsat)
    }

    pub fn saturating_sub(self, other: AmountMsat) -> AmountMsat {
        AmountMsat(self.0.saturating_sub(other.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AmountMsat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}msat", self.0)
    }
}

/// An amount in satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountSat(pub u64);

impl AmountSat {
    /// Convert to millisatoshis; `None` on overflow.
    pub fn to_msat(self) -> Option<AmountMsat> {
        self.0.checked_mul(1000).map(AmountMsat)
    }
}

impl fmt::Display for AmountSat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}sat", self.0)
    }
}

/// Which bound a layer constraint sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Min,
    Max,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Min => write!(f, "minimum"),
            ConstraintKind::Max => write!(f, "maximum"),
        }
    }
}

/// Seconds since the unix epoch.
pub fn now_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(last: u8) -> NodeId {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02;
        bytes[32] = last;
        NodeId::from_bytes(bytes).unwrap()
    }

    #[test]
    fn test_short_channel_id_display_and_parse() {
        let scid = ShortChannelId::from_parts(103, 1, 0).unwrap();
        assert_eq!(scid.to_string(), "103x1x0");
        assert_eq!("103x1x0".parse::<ShortChannelId>().unwrap(), scid);
        assert_eq!(scid.block(), 103);
        assert_eq!(scid.tx_index(), 1);
        assert_eq!(scid.output(), 0);
    }

    #[test]
    fn test_short_channel_id_rejects_garbage() {
        assert!("103x1".parse::<ShortChannelId>().is_err());
        assert!("axbxc".parse::<ShortChannelId>().is_err());
        assert!("16777216x0x0".parse::<ShortChannelId>().is_err());
    }

    #[test]
    fn test_short_channel_id_serde_as_string() {
        let scid = ShortChannelId::from_parts(1, 2, 3).unwrap();
        let json = serde_json::to_string(&scid).unwrap();
        assert_eq!(json, "\"1x2x3\"");
        let back: ShortChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scid);
    }

    #[test]
    fn test_direction_must_be_binary() {
        let scid = ShortChannelId(42);
        assert!(ChannelDirection::new(scid, 0).is_ok());
        assert!(ChannelDirection::new(scid, 1).is_ok());
        assert!(matches!(
            ChannelDirection::new(scid, 2),
            Err(CoreError::InvalidDirection(2))
        ));
    }

    #[test]
    fn test_direction_deserialize_is_validated() {
        let ok: ChannelDirection =
            serde_json::from_str(r#"{"scid":"1x2x3","direction":1}"#).unwrap();
        assert_eq!(ok.direction(), 1);
        assert!(serde_json::from_str::<ChannelDirection>(r#"{"scid":"1x2x3","direction":2}"#).is_err());
    }

    #[test]
    fn test_direction_between_nodes() {
        let scid = ShortChannelId(7);
        let a = node(1);
        let b = node(2);
        assert_eq!(ChannelDirection::between(scid, &a, &b).direction(), 0);
        assert_eq!(ChannelDirection::between(scid, &b, &a).direction(), 1);
        assert_eq!(
            ChannelDirection::between(scid, &a, &b).reverse(),
            ChannelDirection::between(scid, &b, &a)
        );
    }

    #[test]
    fn test_node_id_parse() {
        let hex_id = format!("02{}", "11".repeat(32));
        let id: NodeId = hex_id.parse().unwrap();
        assert_eq!(id.to_string(), hex_id);

        let bad_prefix = format!("05{}", "11".repeat(32));
        assert!(bad_prefix.parse::<NodeId>().is_err());
        assert!("0211".parse::<NodeId>().is_err());
        assert!("zz".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_amount_arithmetic() {
        let a = AmountMsat(1_000);
        assert_eq!(a.checked_add(AmountMsat(500)), Some(AmountMsat(1_500)));
        assert_eq!(AmountMsat::MAX.checked_add(AmountMsat(1)), None);
        assert_eq!(a.checked_sub(AmountMsat(2_000)), None);
        assert_eq!(a.saturating_sub(AmountMsat(2_000)), AmountMsat::ZERO);
        assert_eq!(AmountSat(3).to_msat(), Some(AmountMsat(3_000)));
        assert_eq!(AmountSat(u64::MAX).to_msat(), None);
    }
}
