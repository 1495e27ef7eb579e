//! WMTS GetCapabilities XML parsing.
//!
//! Extracts the tile matrix geometry for one layer: the layer's
//! `TileMatrixSetLink` names the matrix set and carries optional per-zoom
//! index limits; the matching `TileMatrixSet` carries scale denominator,
//! top-left corner and tile pixel size per zoom.
//!
//! Matching is done on local element names so the parser is agnostic to
//! namespace prefixes (`ows:Identifier` vs default-namespaced elements).

use super::types::{Capabilities, CatalogError, TileMatrixInfo};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct MatrixLimits {
    min_row: Option<u32>,
    max_row: Option<u32>,
    min_col: Option<u32>,
    max_col: Option<u32>,
}

/// What the target layer's `TileMatrixSetLink` declares.
#[derive(Debug)]
struct LayerLink {
    /// Identifier of the tile matrix set the layer is published in
    set_id: String,
    /// Per-zoom valid tile index bounds, keyed by the raw zoom identifier
    limits: HashMap<String, MatrixLimits>,
}

/// Parses a capability document into per-zoom matrix geometry for `layer`.
pub fn parse_capabilities(xml: &str, layer: &str) -> Result<Capabilities, CatalogError> {
    let link = parse_layer_link(xml, layer)?;
    parse_matrix_set(xml, &link)
}

fn xml_err(e: quick_xml::Error) -> CatalogError {
    CatalogError::Xml(e.to_string())
}

/// First pass: find the layer and its TileMatrixSetLink.
fn parse_layer_link(xml: &str, layer: &str) -> Result<LayerLink, CatalogError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut text = String::new();

    let mut in_layer = false;
    let mut layer_id_seen = false;
    let mut layer_matched = false;
    let mut in_link = false;
    let mut in_limits_entry = false;

    let mut set_id: Option<String> = None;
    let mut limits: HashMap<String, MatrixLimits> = HashMap::new();
    let mut entry_zoom = String::new();
    let mut entry = MatrixLimits::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                text.clear();
                match e.local_name().as_ref() {
                    b"Layer" => {
                        in_layer = true;
                        layer_id_seen = false;
                        layer_matched = false;
                    }
                    b"TileMatrixSetLink" if layer_matched => in_link = true,
                    b"TileMatrixLimits" if in_link => {
                        in_limits_entry = true;
                        entry_zoom.clear();
                        entry = MatrixLimits::default();
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                text = t.unescape().map_err(xml_err)?.into_owned();
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"Identifier" if in_layer && !layer_id_seen => {
                        // The layer's own identifier is the first one
                        // inside the <Layer> element.
                        layer_id_seen = true;
                        layer_matched = text == layer;
                    }
                    b"TileMatrixSet" if in_link => {
                        set_id = Some(text.clone());
                    }
                    b"TileMatrix" if in_limits_entry => {
                        entry_zoom = text.clone();
                    }
                    b"MinTileRow" if in_limits_entry => entry.min_row = text.parse().ok(),
                    b"MaxTileRow" if in_limits_entry => entry.max_row = text.parse().ok(),
                    b"MinTileCol" if in_limits_entry => entry.min_col = text.parse().ok(),
                    b"MaxTileCol" if in_limits_entry => entry.max_col = text.parse().ok(),
                    b"TileMatrixLimits" => {
                        if in_limits_entry && !entry_zoom.is_empty() {
                            limits.insert(entry_zoom.clone(), entry.clone());
                        }
                        in_limits_entry = false;
                    }
                    b"TileMatrixSetLink" => in_link = false,
                    b"Layer" => {
                        if layer_matched {
                            // Everything we need from this pass is read.
                            break;
                        }
                        in_layer = false;
                    }
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match set_id {
        Some(set_id) => Ok(LayerLink { set_id, limits }),
        None => Err(CatalogError::LayerNotFound(layer.to_string())),
    }
}

/// Second pass: read the per-zoom geometry of the linked matrix set.
fn parse_matrix_set(xml: &str, link: &LayerLink) -> Result<Capabilities, CatalogError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut text = String::new();

    let mut in_set = false;
    let mut set_id_seen = false;
    let mut set_matched = false;
    let mut in_matrix = false;

    let mut entries: HashMap<u8, TileMatrixInfo> = HashMap::new();

    let mut matrix_zoom = String::new();
    let mut scale: Option<f64> = None;
    let mut origin: Option<(f64, f64)> = None;
    let mut tile_width: Option<u32> = None;
    let mut tile_height: Option<u32> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                text.clear();
                match e.local_name().as_ref() {
                    b"TileMatrixSet" => {
                        in_set = true;
                        set_id_seen = false;
                        set_matched = false;
                    }
                    b"TileMatrix" if set_matched => {
                        in_matrix = true;
                        matrix_zoom.clear();
                        scale = None;
                        origin = None;
                        tile_width = None;
                        tile_height = None;
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                text = t.unescape().map_err(xml_err)?.into_owned();
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"Identifier" if in_matrix => {
                        matrix_zoom = text.clone();
                    }
                    b"Identifier" if in_set && !set_id_seen => {
                        set_id_seen = true;
                        set_matched = text == link.set_id;
                    }
                    b"ScaleDenominator" if in_matrix => scale = text.parse().ok(),
                    b"TopLeftCorner" if in_matrix => {
                        let mut parts = text.split_whitespace();
                        let x = parts.next().and_then(|v| v.parse::<f64>().ok());
                        let y = parts.next().and_then(|v| v.parse::<f64>().ok());
                        origin = x.zip(y);
                    }
                    b"TileWidth" if in_matrix => tile_width = text.parse().ok(),
                    b"TileHeight" if in_matrix => tile_height = text.parse().ok(),
                    b"TileMatrix" if in_matrix => {
                        in_matrix = false;
                        // Some matrix sets qualify identifiers ("PM:12");
                        // only the numeric tail addresses a zoom level.
                        let zoom_text = matrix_zoom
                            .rsplit(':')
                            .next()
                            .unwrap_or(matrix_zoom.as_str());
                        if let Ok(zoom) = zoom_text.parse::<u8>() {
                            let info = build_info(
                                &matrix_zoom,
                                scale,
                                origin,
                                tile_width,
                                tile_height,
                                link.limits.get(&matrix_zoom),
                            )?;
                            entries.insert(zoom, info);
                        }
                    }
                    b"TileMatrixSet" => in_set = false,
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if entries.is_empty() {
        return Err(CatalogError::LayerNotFound(link.set_id.clone()));
    }
    Ok(Capabilities::new(entries))
}

fn build_info(
    zoom: &str,
    scale: Option<f64>,
    origin: Option<(f64, f64)>,
    tile_width: Option<u32>,
    tile_height: Option<u32>,
    limits: Option<&MatrixLimits>,
) -> Result<TileMatrixInfo, CatalogError> {
    let malformed = |detail: &str| CatalogError::MalformedEntry {
        zoom: zoom.to_string(),
        detail: detail.to_string(),
    };

    let scale_denominator = scale.ok_or_else(|| malformed("missing ScaleDenominator"))?;
    let (origin_x, origin_y) = origin.ok_or_else(|| malformed("missing TopLeftCorner"))?;
    let tile_width = tile_width.ok_or_else(|| malformed("missing TileWidth"))?;
    let tile_height = tile_height.ok_or_else(|| malformed("missing TileHeight"))?;

    let limits = limits.cloned().unwrap_or_default();

    Ok(TileMatrixInfo {
        scale_denominator,
        tile_width,
        tile_height,
        origin_x,
        origin_y,
        min_row: limits.min_row,
        max_row: limits.max_row,
        min_col: limits.min_col,
        max_col: limits.max_col,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wmts/1.0"
              xmlns:ows="http://www.opengis.net/ows/1.1">
  <Contents>
    <Layer>
      <ows:Title>Some other layer</ows:Title>
      <ows:Identifier>ORTHOIMAGERY</ows:Identifier>
      <Style>
        <ows:Identifier>normal</ows:Identifier>
      </Style>
      <TileMatrixSetLink>
        <TileMatrixSet>OTHER</TileMatrixSet>
      </TileMatrixSetLink>
    </Layer>
    <Layer>
      <ows:Title>Maps</ows:Title>
      <ows:Identifier>GEOGRAPHICALGRIDSYSTEMS.MAPS</ows:Identifier>
      <Style>
        <ows:Identifier>normal</ows:Identifier>
      </Style>
      <TileMatrixSetLink>
        <TileMatrixSet>PM</TileMatrixSet>
        <TileMatrixSetLimits>
          <TileMatrixLimits>
            <TileMatrix>11</TileMatrix>
            <MinTileRow>354</MinTileRow>
            <MaxTileRow>1459</MaxTileRow>
            <MinTileCol>932</MinTileCol>
            <MaxTileCol>2141</MaxTileCol>
          </TileMatrixLimits>
          <TileMatrixLimits>
            <TileMatrix>12</TileMatrix>
            <MinTileRow>708</MinTileRow>
            <MaxTileRow>2919</MaxTileRow>
            <MinTileCol>1864</MinTileCol>
            <MaxTileCol>4282</MaxTileCol>
          </TileMatrixLimits>
        </TileMatrixSetLimits>
      </TileMatrixSetLink>
    </Layer>
    <TileMatrixSet>
      <ows:Identifier>OTHER</ows:Identifier>
      <TileMatrix>
        <ows:Identifier>12</ows:Identifier>
        <ScaleDenominator>1.0</ScaleDenominator>
        <TopLeftCorner>0 0</TopLeftCorner>
        <TileWidth>512</TileWidth>
        <TileHeight>512</TileHeight>
      </TileMatrix>
    </TileMatrixSet>
    <TileMatrixSet>
      <ows:Identifier>PM</ows:Identifier>
      <TileMatrix>
        <ows:Identifier>11</ows:Identifier>
        <ScaleDenominator>272989.38673277234</ScaleDenominator>
        <TopLeftCorner>-20037508.3427892476 20037508.3427892476</TopLeftCorner>
        <TileWidth>256</TileWidth>
        <TileHeight>256</TileHeight>
      </TileMatrix>
      <TileMatrix>
        <ows:Identifier>12</ows:Identifier>
        <ScaleDenominator>136494.69336638617</ScaleDenominator>
        <TopLeftCorner>-20037508.3427892476 20037508.3427892476</TopLeftCorner>
        <TileWidth>256</TileWidth>
        <TileHeight>256</TileHeight>
      </TileMatrix>
    </TileMatrixSet>
  </Contents>
</Capabilities>"#;

    #[test]
    fn parses_layer_limits_and_matrix_geometry() {
        let caps = parse_capabilities(SAMPLE, "GEOGRAPHICALGRIDSYSTEMS.MAPS").unwrap();
        let info = caps.get(12).expect("zoom 12 present");

        assert_eq!(info.scale_denominator, 136494.69336638617);
        assert_eq!(info.origin_x, -20037508.3427892476);
        assert_eq!(info.origin_y, 20037508.3427892476);
        assert_eq!(info.tile_width, 256);
        assert_eq!(info.tile_height, 256);
        assert_eq!(info.min_row, Some(708));
        assert_eq!(info.max_row, Some(2919));
        assert_eq!(info.min_col, Some(1864));
        assert_eq!(info.max_col, Some(4282));
    }

    #[test]
    fn picks_the_linked_matrix_set_not_the_first_one() {
        let caps = parse_capabilities(SAMPLE, "GEOGRAPHICALGRIDSYSTEMS.MAPS").unwrap();
        // OTHER declares 512px tiles at zoom 12; PM declares 256px.
        assert_eq!(caps.get(12).unwrap().tile_width, 256);
    }

    #[test]
    fn unknown_layer_is_an_error() {
        let err = parse_capabilities(SAMPLE, "NO.SUCH.LAYER").unwrap_err();
        assert!(matches!(err, CatalogError::LayerNotFound(_)));
    }
}
