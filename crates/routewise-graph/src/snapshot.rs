use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use routewise_core::{AmountSat, ChannelDirection, NodeId, ShortChannelId};
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, HalfChannel};
use crate::error::GraphError;
use crate::localmods::LocalMods;
use crate::memory::MemoryGraph;
use crate::view::GraphView;

/// One channel in a graph snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotChannel {
    pub short_channel_id: ShortChannelId,
    pub node_1: NodeId,
    pub node_2: NodeId,
    #[serde(default)]
    pub capacity_sat: Option<AmountSat>,
    /// Policies indexed by channel direction; direction 0 leaves the lesser
    /// of the two node ids.
    #[serde(default)]
    pub updates: [Option<HalfChannel>; 2],
}

/// Serialized form of the public network graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub channels: Vec<SnapshotChannel>,
}

impl GraphSnapshot {
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let contents = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Reject snapshots that could not be applied in full: repeated channel
    /// ids and channels from a node to itself.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen = HashSet::with_capacity(self.channels.len());
        for entry in &self.channels {
            if !seen.insert(entry.short_channel_id) {
                return Err(GraphError::DuplicateChannel(entry.short_channel_id));
            }
            if entry.node_1 == entry.node_2 {
                return Err(GraphError::SelfLoop(entry.short_channel_id));
            }
        }
        Ok(())
    }
}

impl MemoryGraph {
    /// Build a graph from a snapshot.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = MemoryGraph::new();
        graph.sync_snapshot(snapshot)?;
        Ok(graph)
    }

    /// Bring the graph in line with `snapshot`, keeping the indices of
    /// channels present in both.
    ///
    /// The snapshot is checked before anything changes, so an error leaves
    /// the graph as it was.
    pub fn sync_snapshot(&mut self, snapshot: &GraphSnapshot) -> Result<(), GraphError> {
        if self.has_local_mods() {
            return Err(GraphError::LocalModsApplied);
        }
        snapshot.validate()?;

        let wanted: HashSet<ShortChannelId> = snapshot
            .channels
            .iter()
            .map(|c| c.short_channel_id)
            .collect();
        let stale: Vec<ShortChannelId> = self
            .channels()
            .map(|c| c.scid)
            .filter(|scid| !wanted.contains(scid))
            .collect();
        for scid in &stale {
            self.remove_channel(scid)?;
        }

        for entry in &snapshot.channels {
            let known = self
                .find_channel(&entry.short_channel_id)
                .map(|existing| same_endpoints(existing, entry));
            match known {
                Some(false) => {
                    tracing::warn!(
                        scid = %entry.short_channel_id,
                        "channel endpoints changed, re-adding"
                    );
                    self.remove_channel(&entry.short_channel_id)?;
                    self.insert_channel(
                        entry.short_channel_id,
                        entry.node_1,
                        entry.node_2,
                        entry.capacity_sat,
                    )?;
                }
                Some(true) => self.set_capacity(&entry.short_channel_id, entry.capacity_sat)?,
                None => {
                    self.insert_channel(
                        entry.short_channel_id,
                        entry.node_1,
                        entry.node_2,
                        entry.capacity_sat,
                    )?;
                }
            }
            for (dir, update) in entry.updates.iter().enumerate() {
                let Some(update) = update else { continue };
                let scidd = ChannelDirection::new(entry.short_channel_id, dir as u32)?;
                let unchanged = self
                    .find_channel(&entry.short_channel_id)
                    .and_then(|c| c.half(scidd.direction()))
                    == Some(update);
                if !unchanged {
                    self.update_channel(scidd, update.clone())?;
                }
            }
        }
        Ok(())
    }
}

fn same_endpoints(channel: &Channel, entry: &SnapshotChannel) -> bool {
    channel.touches(&entry.node_1) && channel.touches(&entry.node_2)
}

/// A [`MemoryGraph`] backed by a snapshot file, re-read whenever the file's
/// modification time changes.
#[derive(Debug)]
pub struct SnapshotGraph {
    path: PathBuf,
    modified: Option<SystemTime>,
    graph: MemoryGraph,
}

impl SnapshotGraph {
    /// Load the snapshot at `path`. Failure here means there is no graph to
    /// route over.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GraphError> {
        let path = path.into();
        let modified = modified_time(&path);
        let snapshot = GraphSnapshot::load(&path)?;
        let graph = MemoryGraph::from_snapshot(&snapshot)?;
        tracing::info!(
            path = %path.display(),
            channels = graph.channel_count(),
            "loaded graph snapshot"
        );
        Ok(Self {
            path,
            modified,
            graph,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn channel_count(&self) -> usize {
        self.graph.channel_count()
    }

    fn reload(&mut self) -> Result<(), GraphError> {
        let snapshot = GraphSnapshot::load(&self.path)?;
        self.graph.sync_snapshot(&snapshot)
    }

    pub fn graph(&self) -> &MemoryGraph {
        &self.graph
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl GraphView for SnapshotGraph {
    fn refresh(&mut self) -> bool {
        let modified = modified_time(&self.path);
        if modified.is_some() && modified != self.modified {
            // A bad file is not retried until it is written again.
            self.modified = modified;
            match self.reload() {
                Ok(()) => tracing::info!(
                    path = %self.path.display(),
                    channels = self.graph.channel_count(),
                    "reloaded graph snapshot"
                ),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "graph snapshot reload failed, keeping previous view"
                ),
            }
        }
        self.graph.refresh()
    }

    fn max_channel_index(&self) -> usize {
        self.graph.max_channel_index()
    }

    fn channels(&self) -> Box<dyn Iterator<Item = &Channel> + '_> {
        self.graph.channels()
    }

    fn find_channel(&self, scid: &ShortChannelId) -> Option<&Channel> {
        self.graph.find_channel(scid)
    }

    fn node_channels(&self, node: &NodeId) -> Vec<&Channel> {
        self.graph.node_channels(node)
    }

    fn apply_local_mods(&mut self, mods: &LocalMods) -> Result<(), GraphError> {
        self.graph.apply_local_mods(mods)
    }

    fn remove_local_mods(&mut self, mods: &LocalMods) {
        self.graph.remove_local_mods(mods)
    }
}
