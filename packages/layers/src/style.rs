//! Visual mapping from anomaly records to marker and label styles.
//!
//! A [`VisualMapping`] is built for one selected id. It precomputes the
//! per-severity marker styles and the selected/unselected label styles so
//! per-record lookups are table reads.

use carbon_sense_anomaly_models::{Rgba, Severity};
use serde::{Deserialize, Serialize};

use crate::record::AnomalyRecord;

/// Colors and sizes for the anomaly layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerTheme {
    /// Alpha of unselected marker fills.
    pub marker_alpha: u8,
    /// Outline of unselected markers.
    pub outline_color: Rgba,
    /// Outline width of unselected markers, in pixels.
    pub outline_width: f32,
    /// Fill of the selected marker.
    pub selected_fill: Rgba,
    /// Outline of the selected marker.
    pub selected_outline: Rgba,
    /// Outline width of the selected marker, in pixels.
    pub selected_outline_width: f32,
    /// Label font size, in pixels.
    pub font_size: f32,
    /// Font size of the selected marker's label.
    pub selected_font_size: f32,
    /// Label text color.
    pub text_color: Rgba,
    /// Label background.
    pub text_background: Rgba,
}

impl Default for LayerTheme {
    fn default() -> Self {
        Self {
            marker_alpha: 200,
            outline_color: [255, 255, 255, 255],
            outline_width: 1.0,
            selected_fill: [255, 255, 255, 255],
            selected_outline: [33, 33, 33, 255],
            selected_outline_width: 3.0,
            font_size: 12.0,
            selected_font_size: 16.0,
            text_color: [33, 33, 33, 255],
            text_background: [255, 255, 255, 220],
        }
    }
}

/// Style of one marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Fill color.
    pub fill_color: Rgba,
    /// Outline color.
    pub line_color: Rgba,
    /// Outline width, in pixels.
    pub line_width: f32,
}

/// Style of one text label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyle {
    /// Font size, in pixels.
    pub size: f32,
    /// Text color.
    pub color: Rgba,
    /// Background color.
    pub background: Rgba,
}

/// Record-to-style mapping for one selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMapping {
    selected: Option<u32>,
    markers: [MarkerStyle; 3],
    selected_marker: MarkerStyle,
    label: LabelStyle,
    selected_label: LabelStyle,
}

const fn severity_index(severity: Severity) -> usize {
    match severity {
        Severity::High => 0,
        Severity::Medium => 1,
        Severity::Low => 2,
    }
}

impl VisualMapping {
    /// Builds the mapping for `selected` under `theme`.
    #[must_use]
    pub fn new(selected: Option<u32>, theme: &LayerTheme) -> Self {
        let marker = |severity: Severity| MarkerStyle {
            fill_color: severity.color_with_alpha(theme.marker_alpha),
            line_color: theme.outline_color,
            line_width: theme.outline_width,
        };

        Self {
            selected,
            markers: [
                marker(Severity::High),
                marker(Severity::Medium),
                marker(Severity::Low),
            ],
            selected_marker: MarkerStyle {
                fill_color: theme.selected_fill,
                line_color: theme.selected_outline,
                line_width: theme.selected_outline_width,
            },
            label: LabelStyle {
                size: theme.font_size,
                color: theme.text_color,
                background: theme.text_background,
            },
            // Inverted: background and text swap.
            selected_label: LabelStyle {
                size: theme.selected_font_size,
                color: theme.text_background,
                background: theme.text_color,
            },
        }
    }

    /// The selection this mapping was built for.
    #[must_use]
    pub const fn selected(&self) -> Option<u32> {
        self.selected
    }

    fn is_selected<T: AnomalyRecord + ?Sized>(&self, record: &T) -> bool {
        self.selected == Some(record.id())
    }

    /// Marker style for `record`.
    #[must_use]
    pub fn marker<T: AnomalyRecord + ?Sized>(&self, record: &T) -> MarkerStyle {
        if self.is_selected(record) {
            self.selected_marker
        } else {
            self.markers[severity_index(record.severity())]
        }
    }

    /// Label style for `record`.
    #[must_use]
    pub fn label<T: AnomalyRecord + ?Sized>(&self, record: &T) -> LabelStyle {
        if self.is_selected(record) {
            self.selected_label
        } else {
            self.label
        }
    }
}

#[cfg(test)]
mod tests {
    use carbon_sense_anomaly_models::{AnomalyInfo, DetectedAnomalyKind};

    use super::*;

    fn info(id: u32, kind: DetectedAnomalyKind) -> AnomalyInfo {
        AnomalyInfo {
            id,
            location: [0.0, 0.0],
            severity: kind.severity(),
            kind,
            description: String::new(),
        }
    }

    #[test]
    fn unselected_markers_use_severity_colors() {
        let mapping = VisualMapping::new(None, &LayerTheme::default());
        let high = mapping.marker(&info(1, DetectedAnomalyKind::UnusualCarbonGrowth));
        let medium = mapping.marker(&info(2, DetectedAnomalyKind::BoundaryInconsistency));

        assert_eq!(high.fill_color, [255, 0, 0, 200]);
        assert_eq!(medium.fill_color, [255, 165, 0, 200]);
        assert_eq!(high.line_color, [255, 255, 255, 255]);
    }

    #[test]
    fn selected_marker_is_white_with_bold_dark_outline() {
        let theme = LayerTheme::default();
        let mapping = VisualMapping::new(Some(4), &theme);
        let selected = mapping.marker(&info(4, DetectedAnomalyKind::DeforestationAlert));
        let other = mapping.marker(&info(3, DetectedAnomalyKind::LulcChange));

        assert_eq!(selected.fill_color, [255, 255, 255, 255]);
        assert_eq!(selected.line_color, theme.selected_outline);
        assert!(selected.line_width > other.line_width);
    }

    #[test]
    fn selected_label_is_larger_and_inverted() {
        let theme = LayerTheme::default();
        let mapping = VisualMapping::new(Some(2), &theme);
        let selected = mapping.label(&info(2, DetectedAnomalyKind::BoundaryInconsistency));
        let other = mapping.label(&info(3, DetectedAnomalyKind::LulcChange));

        assert!(selected.size > other.size);
        assert_eq!(selected.color, other.background);
        assert_eq!(selected.background, other.color);
    }
}
