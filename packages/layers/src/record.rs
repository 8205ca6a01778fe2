//! Common view over the records both anomaly synthesizers produce.

use carbon_sense_anomaly_models::{AnomalyInfo, AnomalyPoint, LngLat, Severity};

/// What a map layer needs from an anomaly record.
pub trait AnomalyRecord {
    /// Record id, unique within its batch.
    fn id(&self) -> u32;

    /// Where to draw the record.
    fn position(&self) -> LngLat;

    /// Severity, driving color.
    fn severity(&self) -> Severity;

    /// Short category label used as the marker text.
    fn label(&self) -> &str;

    /// Long-form explanation for the details view.
    fn description(&self) -> &str;

    /// Marker radius. Defaults to the severity lookup.
    fn radius(&self) -> u32 {
        self.severity().radius()
    }
}

impl AnomalyRecord for AnomalyPoint {
    fn id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> LngLat {
        self.position
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn label(&self) -> &str {
        self.kind.as_ref()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn radius(&self) -> u32 {
        self.radius
    }
}

impl AnomalyRecord for AnomalyInfo {
    fn id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> LngLat {
        self.location
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn label(&self) -> &str {
        self.kind.as_ref()
    }

    fn description(&self) -> &str {
        &self.description
    }
}
