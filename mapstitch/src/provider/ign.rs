//! IGN Géoportail WMTS provider.
//!
//! French national mapping agency imagery served over WMTS. Unlike
//! slippy-map servers, the grid geometry (scale denominator, origin,
//! tile size per zoom) is published in a GetCapabilities document and
//! must be resolved through the capability catalog before any tile
//! address can be computed.
//!
//! The API key is an explicit constructor argument; it is part of every
//! request URL, never process-wide state.

use super::types::TileProvider;
use crate::coord::TileCoord;

/// Layer identifier requested from the capability document.
pub const IGN_LAYER: &str = "GEOGRAPHICALGRIDSYSTEMS.MAPS";

/// Tile matrix set the layer is published in (Web Mercator).
pub const IGN_MATRIX_SET: &str = "PM";

/// IGN Géoportail WMTS tile provider.
pub struct IgnProvider {
    api_key: String,
}

impl IgnProvider {
    /// Creates a provider bound to one API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// GetCapabilities URL for this key.
    pub fn capabilities_url(&self) -> String {
        format!(
            "https://wxs.ign.fr/{}/geoportail/wmts?SERVICE=WMTS&REQUEST=GetCapabilities",
            self.api_key
        )
    }
}

impl TileProvider for IgnProvider {
    fn tile_url(&self, tile: &TileCoord) -> String {
        format!(
            "https://wxs.ign.fr/{}/geoportail/wmts?layer={}&style=normal&tilematrixset={}\
             &Service=WMTS&Request=GetTile&Version=1.0.0&Format=image%2Fjpeg\
             &TileMatrix={}&TileCol={}&TileRow={}",
            self.api_key, IGN_LAYER, IGN_MATRIX_SET, tile.zoom, tile.col, tile.row
        )
    }

    fn name(&self) -> &str {
        "ign"
    }

    fn tile_format(&self) -> &str {
        "jpg"
    }

    fn min_zoom(&self) -> u8 {
        0
    }

    fn max_zoom(&self) -> u8 {
        18
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_wmts_get_tile_url() {
        let provider = IgnProvider::new("demokey");
        let url = provider.tile_url(&TileCoord::new(2076, 1436, 12));

        assert!(url.starts_with("https://wxs.ign.fr/demokey/geoportail/wmts?"));
        assert!(url.contains("Request=GetTile"));
        assert!(url.contains("TileMatrix=12"));
        assert!(url.contains("TileCol=2076"));
        assert!(url.contains("TileRow=1436"));
    }

    #[test]
    fn capabilities_url_carries_the_key() {
        let provider = IgnProvider::new("demokey");
        assert!(provider
            .capabilities_url()
            .contains("/demokey/geoportail/wmts?SERVICE=WMTS&REQUEST=GetCapabilities"));
    }
}
