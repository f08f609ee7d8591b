use routewise_core::{AmountMsat, AmountSat};
use routewise_graph::GraphView;

const MANTISSA_BITS: u32 = 11;
const MANTISSA_MASK: u16 = (1 << MANTISSA_BITS) - 1;
const MAX_EXPONENT: u32 = 31;

/// A 16-bit lossy encoding of a satoshi amount: 5 exponent bits over an
/// 11-bit mantissa, `value = mantissa << exponent`.
///
/// Encoding always rounds down, so a decoded capacity never exceeds the real
/// one. Amounts beyond the largest representable value (about 43,980 BTC)
/// saturate at that value. Zero encodes to zero and is used as the
/// "unknown" sentinel by [`CapacityTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fp16(u16);

impl Fp16 {
    pub const ZERO: Fp16 = Fp16(0);

    pub fn encode(value: u64) -> Self {
        let bits = 64 - value.leading_zeros();
        if bits <= MANTISSA_BITS {
            return Fp16(value as u16);
        }
        let exponent = bits - MANTISSA_BITS;
        if exponent > MAX_EXPONENT {
            return Fp16(((MAX_EXPONENT as u16) << MANTISSA_BITS) | MANTISSA_MASK);
        }
        let mantissa = (value >> exponent) as u16 & MANTISSA_MASK;
        Fp16(((exponent as u16) << MANTISSA_BITS) | mantissa)
    }

    pub fn decode(self) -> u64 {
        let exponent = (self.0 >> MANTISSA_BITS) as u32;
        let mantissa = (self.0 & MANTISSA_MASK) as u64;
        mantissa << exponent
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Per-channel capacity cache indexed by graph channel index.
///
/// A zero entry means "resolve the slow way": the channel is unknown, has
/// no capacity, or is overridden by a layer or reservation.
#[derive(Debug, Clone, Default)]
pub struct CapacityTable {
    entries: Vec<Fp16>,
}

impl CapacityTable {
    /// Build the table from every channel in `graph`.
    pub fn build(graph: &dyn GraphView) -> Self {
        let mut entries = vec![Fp16::ZERO; graph.max_channel_index()];
        for channel in graph.channels() {
            let capacity = graph.channel_capacity(channel).unwrap_or_else(|| {
                tracing::error!(scid = %channel.scid, "channel without capacity in graph");
                AmountSat(0)
            });
            if let Some(slot) = entries.get_mut(channel.index) {
                *slot = Fp16::encode(capacity.0);
            }
        }
        tracing::debug!(channels = entries.len(), "rebuilt capacity table");
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cached capacity of the channel at `index`, or `None` if the slow
    /// path must be used.
    pub fn get(&self, index: usize) -> Option<AmountMsat> {
        let entry = self.entries.get(index)?;
        if entry.is_zero() {
            return None;
        }
        AmountSat(entry.decode()).to_msat()
    }

    /// `capacity` as the cache would report it, for lookups that bypass the
    /// cache but must not promise more than it would.
    pub fn rounded(capacity: AmountSat) -> Option<AmountMsat> {
        AmountSat(Fp16::encode(capacity.0).decode()).to_msat()
    }

    /// Force the slow path for the channel at `index`.
    pub fn clear(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = Fp16::ZERO;
        }
    }

    /// Number of entries that still take the fast path.
    pub fn known(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_zero()).count()
    }
}
