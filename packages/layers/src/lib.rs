#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renderer-neutral map layers for anomaly records.
//!
//! [`AnomalyLayers`] turns a collection of [`AnomalyRecord`]s into two
//! layer descriptors keyed by the same records: a scatter layer of
//! severity-colored markers and a text layer of type labels. One record
//! may be selected, which swaps its marker and label to the highlight
//! styles from [`LayerTheme`].
//!
//! Rebuilding map layers is expensive, so the [`VisualMapping`] is only
//! recomputed when the selected id actually changes. Each recompute bumps
//! [`AnomalyLayers::mapping_generation`], which renderers use as the
//! update trigger for the style accessors.

pub mod interaction;
pub mod record;
pub mod style;

use std::rc::Rc;

use carbon_sense_anomaly_models::{LngLat, Rgba};
use serde::Serialize;

pub use interaction::{AnomalyInspector, LayerCallbacks};
pub use record::AnomalyRecord;
pub use style::{LabelStyle, LayerTheme, MarkerStyle, VisualMapping};

/// Id of the marker layer.
pub const MARKER_LAYER_ID: &str = "anomaly-markers";

/// Id of the label layer.
pub const LABEL_LAYER_ID: &str = "anomaly-labels";

/// One marker in the scatter layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDatum {
    /// Source record id.
    pub id: u32,
    /// Marker position.
    pub position: LngLat,
    /// Marker radius.
    pub radius: u32,
    /// Fill color.
    pub fill_color: Rgba,
    /// Outline color.
    pub line_color: Rgba,
    /// Outline width, in pixels.
    pub line_width: f32,
}

/// One label in the text layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDatum {
    /// Source record id.
    pub id: u32,
    /// Label anchor.
    pub position: LngLat,
    /// Label text.
    pub text: String,
    /// Font size, in pixels.
    pub size: f32,
    /// Text color.
    pub color: Rgba,
    /// Background color.
    pub background: Rgba,
}

/// A renderable layer descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer<D> {
    /// Layer id.
    pub id: &'static str,
    /// Whether the layer reports hover and click picks.
    pub pickable: bool,
    /// Per-record render data.
    pub data: Vec<D>,
    /// Changes exactly when the style accessors change.
    pub update_trigger: u64,
}

/// The marker and label layers for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSet {
    /// Severity-colored markers.
    pub markers: Layer<MarkerDatum>,
    /// Type labels.
    pub labels: Layer<LabelDatum>,
}

/// Owns anomaly records, the current selection, and the memoized visual
/// mapping for that selection.
pub struct AnomalyLayers<T> {
    records: Vec<T>,
    theme: LayerTheme,
    mapping: Rc<VisualMapping>,
    mapping_generation: u64,
    callbacks: LayerCallbacks<T>,
}

impl<T: AnomalyRecord> AnomalyLayers<T> {
    /// Creates layers over `records` with nothing selected.
    #[must_use]
    pub fn new(records: Vec<T>, theme: LayerTheme) -> Self {
        Self {
            records,
            mapping: Rc::new(VisualMapping::new(None, &theme)),
            theme,
            mapping_generation: 0,
            callbacks: LayerCallbacks::default(),
        }
    }

    /// Installs hover and click handlers.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: LayerCallbacks<T>) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Replaces the records. The visual mapping is left untouched.
    pub fn set_records(&mut self, records: Vec<T>) {
        self.records = records;
    }

    /// The records being drawn.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Currently selected id.
    #[must_use]
    pub fn selected(&self) -> Option<u32> {
        self.mapping.selected()
    }

    /// Selects `id` (or clears the selection). Recomputes the visual
    /// mapping only if the selection changed; returns whether it did.
    pub fn set_selected(&mut self, id: Option<u32>) -> bool {
        if self.mapping.selected() == id {
            return false;
        }

        self.mapping = Rc::new(VisualMapping::new(id, &self.theme));
        self.mapping_generation += 1;
        log::trace!(
            "Recomputed anomaly visual mapping for selection {id:?} (generation {})",
            self.mapping_generation
        );
        true
    }

    /// Number of times the visual mapping has been recomputed.
    #[must_use]
    pub const fn mapping_generation(&self) -> u64 {
        self.mapping_generation
    }

    /// Shared handle to the current visual mapping.
    #[must_use]
    pub fn mapping(&self) -> Rc<VisualMapping> {
        Rc::clone(&self.mapping)
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn record(&self, id: u32) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Builds the marker layer.
    #[must_use]
    pub fn marker_layer(&self) -> Layer<MarkerDatum> {
        let data = self
            .records
            .iter()
            .map(|record| {
                let style = self.mapping.marker(record);
                MarkerDatum {
                    id: record.id(),
                    position: record.position(),
                    radius: record.radius(),
                    fill_color: style.fill_color,
                    line_color: style.line_color,
                    line_width: style.line_width,
                }
            })
            .collect();

        Layer {
            id: MARKER_LAYER_ID,
            pickable: true,
            data,
            update_trigger: self.mapping_generation,
        }
    }

    /// Builds the label layer.
    #[must_use]
    pub fn label_layer(&self) -> Layer<LabelDatum> {
        let data = self
            .records
            .iter()
            .map(|record| {
                let style = self.mapping.label(record);
                LabelDatum {
                    id: record.id(),
                    position: record.position(),
                    text: record.label().to_string(),
                    size: style.size,
                    color: style.color,
                    background: style.background,
                }
            })
            .collect();

        Layer {
            id: LABEL_LAYER_ID,
            pickable: false,
            data,
            update_trigger: self.mapping_generation,
        }
    }

    /// Builds both layers.
    #[must_use]
    pub fn layers(&self) -> LayerSet {
        LayerSet {
            markers: self.marker_layer(),
            labels: self.label_layer(),
        }
    }

    /// Reports a hover pick (or the pointer leaving every marker) to the
    /// hover callback and returns the hovered record.
    pub fn hover(&mut self, id: Option<u32>) -> Option<&T> {
        let idx = id.and_then(|id| self.records.iter().position(|r| r.id() == id));
        let record = idx.map(|i| &self.records[i]);
        self.callbacks.hovered(record);
        record
    }

    /// Reports a click pick to the click callback and returns the clicked
    /// record. Unknown ids are ignored.
    pub fn click(&mut self, id: u32) -> Option<&T> {
        let idx = self.records.iter().position(|r| r.id() == id)?;
        let record = &self.records[idx];
        self.callbacks.clicked(record);
        Some(record)
    }
}
