use std::collections::BTreeMap;

use crate::error::OracleError;
use crate::layer::{Layer, LayerSummary};

/// Owner of every layer, keyed by name. Layers are never deleted.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: BTreeMap<String, Layer>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(name)
    }

    /// Create an empty layer. Fails if the name is taken.
    pub fn create(&mut self, name: &str) -> Result<&mut Layer, OracleError> {
        if self.layers.contains_key(name) {
            return Err(OracleError::LayerExists(name.to_string()));
        }
        tracing::info!(layer = %name, "created layer");
        Ok(self
            .layers
            .entry(name.to_string())
            .or_insert_with(|| Layer::new(name)))
    }

    pub fn find_or_create(&mut self, name: &str) -> &mut Layer {
        if !self.layers.contains_key(name) {
            tracing::info!(layer = %name, "created layer");
        }
        self.layers
            .entry(name.to_string())
            .or_insert_with(|| Layer::new(name))
    }

    /// Summaries of all layers in name order, or of the named one only.
    pub fn list(&self, name: Option<&str>) -> Vec<LayerSummary> {
        match name {
            Some(name) => self.find(name).map(Layer::summary).into_iter().collect(),
            None => self.layers.values().map(Layer::summary).collect(),
        }
    }

    /// Remove constraints older than `cutoff` from the named layer.
    pub fn trim_constraints(&mut self, name: &str, cutoff: u64) -> Result<usize, OracleError> {
        let layer = self
            .find_mut(name)
            .ok_or_else(|| OracleError::UnknownLayer(name.to_string()))?;
        let removed = layer.trim_constraints(cutoff);
        tracing::debug!(layer = %name, cutoff, removed, "trimmed constraints");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routewise_core::{AmountMsat, ChannelDirection, ConstraintKind, ShortChannelId};

    #[test]
    fn test_create_twice_fails() {
        let mut store = LayerStore::new();
        store.create("alpha").unwrap();
        assert!(matches!(
            store.create("alpha"),
            Err(OracleError::LayerExists(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_or_create_is_stable() {
        let mut store = LayerStore::new();
        assert!(store.find("beta").is_none());
        store.find_or_create("beta");
        store.find_or_create("beta");
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("beta").unwrap().name(), "beta");
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let mut store = LayerStore::new();
        store.find_or_create("zeta");
        store.find_or_create("alpha");
        let names: Vec<String> = store.list(None).into_iter().map(|s| s.layer).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(store.list(Some("zeta")).len(), 1);
        assert!(store.list(Some("missing")).is_empty());
    }

    #[test]
    fn test_trim_unknown_layer_is_not_found() {
        let mut store = LayerStore::new();
        let err = store.trim_constraints("nope", 0).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_trim_known_layer() {
        let mut store = LayerStore::new();
        let layer = store.find_or_create("age");
        let scidd = ChannelDirection::new(ShortChannelId(1), 0).unwrap();
        layer.update_constraint(scidd, ConstraintKind::Max, 5, AmountMsat(1));
        layer.update_constraint(scidd, ConstraintKind::Min, 15, AmountMsat(1));

        assert_eq!(store.trim_constraints("age", 10).unwrap(), 1);
        assert_eq!(store.trim_constraints("age", 10).unwrap(), 0);
        assert_eq!(store.find("age").unwrap().constraints().len(), 1);
    }
}
