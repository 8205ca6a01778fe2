//! Layer registration and visibility controls.
//!
//! Overlays are announced to an optional [`LayerRegistry`] after each
//! detection run. Registration is fire-and-forget: there is no
//! acknowledgement and no retry, and a missing registry is not an error.
//!
//! [`LayerControls`] is the visibility surface a layer panel exposes.
//! [`LayerPanel`] implements both traits in memory.

use carbon_sense_anomaly_models::{Rgb, Severity};
use serde::{Deserialize, Serialize};

use crate::overlay::{AREAS_LAYER_ID, POINTS_LAYER_ID};

/// Receives overlay layers as they are produced.
pub trait LayerRegistry {
    /// Announces an overlay layer. Re-registering an id replaces it.
    fn register_overlay_layer(&mut self, id: &str, name: &str, color: Rgb, visible: bool);
}

/// Visibility controls over registered layers.
pub trait LayerControls {
    /// All known layers in registration order.
    fn list_layers(&self) -> Vec<LayerEntry>;

    /// Flips the visibility of `id`. Returns `false` if no such layer.
    fn toggle_layer(&mut self, id: &str) -> bool;

    /// Shows or hides every layer.
    fn set_all_layers_visible(&mut self, visible: bool);
}

/// One registered layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    /// Stable layer id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Legend color.
    pub color: Rgb,
    /// Whether the layer is drawn.
    pub visible: bool,
}

/// In-memory layer list implementing both [`LayerRegistry`] and
/// [`LayerControls`].
#[derive(Debug, Clone, Default)]
pub struct LayerPanel {
    layers: Vec<LayerEntry>,
}

impl LayerPanel {
    /// Creates an empty panel.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Looks up a layer by id.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&LayerEntry> {
        self.layers.iter().find(|l| l.id == id)
    }
}

impl LayerRegistry for LayerPanel {
    fn register_overlay_layer(&mut self, id: &str, name: &str, color: Rgb, visible: bool) {
        let entry = LayerEntry {
            id: id.to_string(),
            name: name.to_string(),
            color,
            visible,
        };

        if let Some(existing) = self.layers.iter_mut().find(|l| l.id == id) {
            *existing = entry;
        } else {
            self.layers.push(entry);
        }
    }
}

impl LayerControls for LayerPanel {
    fn list_layers(&self) -> Vec<LayerEntry> {
        self.layers.clone()
    }

    fn toggle_layer(&mut self, id: &str) -> bool {
        match self.layers.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                layer.visible = !layer.visible;
                true
            }
            None => false,
        }
    }

    fn set_all_layers_visible(&mut self, visible: bool) {
        for layer in &mut self.layers {
            layer.visible = visible;
        }
    }
}

/// Announces the point and area overlays to `registry`, if there is one.
pub fn register_overlays(registry: Option<&mut dyn LayerRegistry>) {
    let Some(registry) = registry else {
        log::debug!("No layer registry, skipping overlay registration");
        return;
    };

    registry.register_overlay_layer(
        POINTS_LAYER_ID,
        "Anomaly Points",
        Severity::High.color(),
        true,
    );
    registry.register_overlay_layer(
        AREAS_LAYER_ID,
        "Anomaly Areas",
        Severity::Medium.color(),
        true,
    );
}

/// Lists layers from `controls`, or nothing when no controls are wired up.
///
/// A missing control surface is logged and the caller renders without a
/// layer panel.
#[must_use]
pub fn available_layers(controls: Option<&dyn LayerControls>) -> Vec<LayerEntry> {
    controls.map_or_else(
        || {
            log::warn!("Layer controls unavailable, rendering without layer panel");
            Vec::new()
        },
        LayerControls::list_layers,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_both_overlays() {
        let mut panel = LayerPanel::new();
        register_overlays(Some(&mut panel));

        let layers = panel.list_layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].id, POINTS_LAYER_ID);
        assert_eq!(layers[0].color, [255, 0, 0]);
        assert_eq!(layers[1].id, AREAS_LAYER_ID);
        assert!(layers.iter().all(|l| l.visible));
    }

    #[test]
    fn re_registering_replaces_instead_of_duplicating() {
        let mut panel = LayerPanel::new();
        register_overlays(Some(&mut panel));
        panel.toggle_layer(POINTS_LAYER_ID);
        register_overlays(Some(&mut panel));

        assert_eq!(panel.list_layers().len(), 2);
        assert!(panel.layer(POINTS_LAYER_ID).unwrap().visible);
    }

    #[test]
    fn missing_registry_is_a_no_op() {
        register_overlays(None);
    }

    #[test]
    fn toggle_and_set_all() {
        let mut panel = LayerPanel::new();
        register_overlays(Some(&mut panel));

        assert!(panel.toggle_layer(AREAS_LAYER_ID));
        assert!(!panel.layer(AREAS_LAYER_ID).unwrap().visible);
        assert!(!panel.toggle_layer("nope"));

        panel.set_all_layers_visible(false);
        assert!(panel.list_layers().iter().all(|l| !l.visible));
        panel.set_all_layers_visible(true);
        assert!(panel.list_layers().iter().all(|l| l.visible));
    }

    #[test]
    fn available_layers_degrades_without_controls() {
        assert!(available_layers(None).is_empty());

        let mut panel = LayerPanel::new();
        register_overlays(Some(&mut panel));
        assert_eq!(available_layers(Some(&panel)).len(), 2);
    }
}
