use routewise_core::{AmountSat, NodeId, ShortChannelId};

use crate::channel::Channel;
use crate::localmods::LocalMods;

/// Read access to the network graph plus the ability to temporarily attach
/// local modifications.
///
/// Channel indices are stable for the lifetime of a channel and are always
/// below [`max_channel_index`](GraphView::max_channel_index).
pub trait GraphView: Send {
    /// Pick up changes from the backing source. Returns `true` when the view
    /// changed since the previous call.
    fn refresh(&mut self) -> bool;

    /// One past the largest channel index currently in use.
    fn max_channel_index(&self) -> usize;

    fn channels(&self) -> Box<dyn Iterator<Item = &Channel> + '_>;

    fn find_channel(&self, scid: &ShortChannelId) -> Option<&Channel>;

    fn node_channels(&self, node: &NodeId) -> Vec<&Channel>;

    /// Capacity of a channel, if the graph knows it.
    fn channel_capacity(&self, channel: &Channel) -> Option<AmountSat> {
        channel.capacity
    }

    /// Attach `mods` until [`remove_local_mods`](GraphView::remove_local_mods)
    /// is called. Only one set may be attached at a time.
    fn apply_local_mods(&mut self, mods: &LocalMods) -> Result<(), crate::GraphError>;

    /// Detach the currently applied modifications, restoring the view.
    fn remove_local_mods(&mut self, mods: &LocalMods);
}
