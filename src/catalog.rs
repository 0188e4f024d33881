//! Static geographic content shown on the map

use crate::{
    core::{constants::ANCHOR_CENTER, geo::GeoPoint},
    overlays::base::OverlayEntry,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Points and paths loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoEntityCatalog {
    #[serde(default)]
    points: Vec<GeoPoint>,
    #[serde(default)]
    paths: Vec<Vec<GeoPoint>>,
}

impl GeoEntityCatalog {
    pub fn new(points: Vec<GeoPoint>, paths: Vec<Vec<GeoPoint>>) -> Result<Self> {
        let catalog = Self { points, paths };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The RGUTIS point of interest plus one path with no points yet
    pub fn default_scenario() -> Self {
        Self {
            points: vec![GeoPoint::labelled(55.4331145, 37.5562910, "RGUTIS")],
            paths: vec![Vec::new()],
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn paths(&self) -> &[Vec<GeoPoint>] {
        &self.paths
    }

    /// Overlay entries in append order: paths first, then one centered marker per point
    pub fn to_overlays(&self) -> Vec<OverlayEntry> {
        let paths = self.paths.iter().cloned().map(OverlayEntry::path);
        let markers = self.points.iter().map(|point| {
            OverlayEntry::marker(
                point.clone(),
                (ANCHOR_CENTER, ANCHOR_CENTER),
                point.label().unwrap_or_default(),
            )
        });
        paths.chain(markers).collect()
    }

    fn validate(&self) -> Result<()> {
        let invalid = self
            .points
            .iter()
            .chain(self.paths.iter().flatten())
            .find(|point| !point.is_valid());
        match invalid {
            Some(point) => Err(MapError::InvalidCoordinates(format!(
                "({}, {})",
                point.latitude(),
                point.longitude()
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlays::base::OverlayKind;

    #[test]
    fn test_default_scenario() {
        let catalog = GeoEntityCatalog::default_scenario();
        assert_eq!(catalog.points().len(), 1);
        assert_eq!(catalog.points()[0].label(), Some("RGUTIS"));
        assert_eq!(catalog.paths(), &[Vec::<GeoPoint>::new()]);
    }

    #[test]
    fn test_paths_come_before_markers() {
        let kinds: Vec<_> = GeoEntityCatalog::default_scenario()
            .to_overlays()
            .iter()
            .map(OverlayEntry::kind)
            .collect();
        assert_eq!(kinds, vec![OverlayKind::Path, OverlayKind::Marker]);
    }

    #[test]
    fn test_marker_title_is_point_label() {
        let overlays = GeoEntityCatalog::default_scenario().to_overlays();
        match &overlays[1] {
            OverlayEntry::Marker(marker) => {
                assert_eq!(marker.title(), "RGUTIS");
                assert_eq!(marker.anchor(), (ANCHOR_CENTER, ANCHOR_CENTER));
            }
            other => panic!("expected marker, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_bad_coordinates() {
        let json = r#"{"points": [{"latitude": 95.0, "longitude": 0.0}]}"#;
        assert!(matches!(
            GeoEntityCatalog::from_json(json),
            Err(MapError::InvalidCoordinates(_))
        ));

        let json = r#"{"paths": [[{"latitude": 0.0, "longitude": 0.0}, {"latitude": 0.0, "longitude": 10.0}]]}"#;
        let catalog = GeoEntityCatalog::from_json(json).unwrap();
        assert_eq!(catalog.paths()[0].len(), 2);
        assert!(catalog.points().is_empty());
    }
}
