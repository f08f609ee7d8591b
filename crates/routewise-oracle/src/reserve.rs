use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use routewise_core::{AmountMsat, ChannelDirection, CoreError, ShortChannelId};
use routewise_graph::GraphView;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTable;

/// Capacity committed to in-flight payment attempts on one channel
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "amount_msat")]
    pub amount: AmountMsat,
    /// Number of paths currently holding part of `amount`.
    pub num_htlcs: usize,
}

/// One hop of a path to reserve or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReserveHop", into = "RawReserveHop")]
pub struct ReserveHop {
    pub scidd: ChannelDirection,
    pub amount: AmountMsat,
}

#[derive(Serialize, Deserialize)]
struct RawReserveHop {
    short_channel_id: ShortChannelId,
    direction: u32,
    amount_msat: AmountMsat,
}

impl TryFrom<RawReserveHop> for ReserveHop {
    type Error = CoreError;

    fn try_from(raw: RawReserveHop) -> Result<Self, Self::Error> {
        Ok(Self {
            scidd: ChannelDirection::new(raw.short_channel_id, raw.direction)?,
            amount: raw.amount_msat,
        })
    }
}

impl From<ReserveHop> for RawReserveHop {
    fn from(hop: ReserveHop) -> Self {
        Self {
            short_channel_id: hop.scidd.scid,
            direction: hop.scidd.direction() as u32,
            amount_msat: hop.amount,
        }
    }
}

/// Outstanding reservations keyed by channel direction.
///
/// Each key is updated under its own shard lock, so concurrent callers never
/// observe a torn reservation while distinct keys proceed independently.
/// Multi-hop operations are applied hop by hop and are *not* rolled back:
/// a short return count tells the caller exactly which prefix took effect.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    entries: DashMap<ChannelDirection, Reservation>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve every hop in order. Returns the number applied, which is less
    /// than `path.len()` if a hop would overflow.
    pub fn add(&self, path: &[ReserveHop]) -> usize {
        for (i, hop) in path.iter().enumerate() {
            let mut entry = self.entries.entry(hop.scidd).or_default();
            let Some(amount) = entry.amount.checked_add(hop.amount) else {
                return i;
            };
            entry.amount = amount;
            entry.num_htlcs += 1;
        }
        path.len()
    }

    /// Release every hop in order. Returns the number applied, which is less
    /// than `path.len()` if a hop is not reserved or would underflow.
    pub fn remove(&self, path: &[ReserveHop]) -> usize {
        for (i, hop) in path.iter().enumerate() {
            let Entry::Occupied(mut occupied) = self.entries.entry(hop.scidd) else {
                return i;
            };
            let reservation = occupied.get_mut();
            let Some(amount) = reservation.amount.checked_sub(hop.amount) else {
                return i;
            };
            reservation.amount = amount;
            reservation.num_htlcs = reservation.num_htlcs.saturating_sub(1);
            if reservation.num_htlcs == 0 {
                occupied.remove();
            }
        }
        path.len()
    }

    pub fn find(&self, scidd: &ChannelDirection) -> Option<Reservation> {
        self.entries.get(scidd).map(|r| *r)
    }

    /// Force the slow path in `table` for every channel carrying a non-zero
    /// reservation.
    pub fn clear_from_capacity_table(&self, graph: &dyn GraphView, table: &mut CapacityTable) {
        for entry in self.entries.iter() {
            if entry.value().amount.is_zero() {
                continue;
            }
            if let Some(channel) = graph.find_channel(&entry.key().scid) {
                table.clear(channel.index);
            }
        }
    }

    /// Total amount reserved across all channel directions, saturating.
    pub fn total_reserved(&self) -> AmountMsat {
        self.entries
            .iter()
            .fold(AmountMsat::ZERO, |acc, r| {
                acc.checked_add(r.value().amount).unwrap_or(AmountMsat::MAX)
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
