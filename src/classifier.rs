//! Reserve tag classification
//!
//! The network carries several logical coin flows through one output
//! format. The reserve tag is the only discriminator, so the markers that
//! identify our coin live in a config table (`config/reserve_markers.toml`)
//! rather than in the matching code.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::ConfigError;

const EMBEDDED_MARKERS: &str = include_str!("../config/reserve_markers.toml");

static DEFAULT_MARKERS: Lazy<Result<ReserveMarkers, String>> =
    Lazy::new(|| ReserveMarkers::from_toml_str(EMBEDDED_MARKERS).map_err(|e| e.to_string()));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputClass {
    /// Plain transfer of the recognized coin, or no tag at all
    Normal,
    /// Coinbase or other system-issued output of the recognized coin
    SystemReward,
    /// Tag from some other flow on the same chain; never spendable here
    Foreign,
}

impl OutputClass {
    pub fn is_recognized(self) -> bool {
        !matches!(self, OutputClass::Foreign)
    }
}

/// Marker table as written in TOML (hex strings)
#[derive(Debug, Deserialize)]
struct MarkerFile {
    plain: String,
    #[serde(default)]
    system: Vec<String>,
    #[serde(default)]
    system_prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveMarkers {
    plain: Vec<u8>,
    system: Vec<Vec<u8>>,
    system_prefixes: Vec<Vec<u8>>,
}

impl ReserveMarkers {
    pub fn new(plain: Vec<u8>, system: Vec<Vec<u8>>, system_prefixes: Vec<Vec<u8>>) -> Self {
        Self {
            plain,
            system,
            system_prefixes,
        }
    }

    /// Markers shipped with the crate
    pub fn embedded() -> Result<Self, ConfigError> {
        DEFAULT_MARKERS
            .clone()
            .map_err(|reason| ConfigError::InvalidMarker {
                marker: "config/reserve_markers.toml".to_string(),
                reason,
            })
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: MarkerFile = toml::from_str(source)?;

        let plain = decode_marker(&file.plain)?;
        let system = file
            .system
            .iter()
            .map(|m| decode_marker(m))
            .collect::<Result<Vec<_>, _>>()?;
        let system_prefixes = file
            .system_prefixes
            .iter()
            .map(|m| decode_marker(m))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Reserve markers: plain={}, {} system, {} prefixes",
            file.plain,
            system.len(),
            system_prefixes.len()
        );

        Ok(Self::new(plain, system, system_prefixes))
    }

    pub fn plain(&self) -> &[u8] {
        &self.plain
    }

    pub fn classify(&self, reserve_tag: Option<&[u8]>) -> OutputClass {
        let tag = match reserve_tag {
            None => return OutputClass::Normal,
            Some(tag) if tag.is_empty() => return OutputClass::Normal,
            Some(tag) => tag,
        };

        if tag == self.plain.as_slice() {
            OutputClass::Normal
        } else if self.system.iter().any(|m| tag == m.as_slice()) {
            OutputClass::SystemReward
        } else if self.system_prefixes.iter().any(|p| tag.starts_with(p)) {
            OutputClass::SystemReward
        } else {
            OutputClass::Foreign
        }
    }
}

fn decode_marker(marker: &str) -> Result<Vec<u8>, ConfigError> {
    let bytes = hex::decode(marker.trim()).map_err(|e| ConfigError::InvalidMarker {
        marker: marker.to_string(),
        reason: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(ConfigError::InvalidMarker {
            marker: marker.to_string(),
            reason: "marker must not be empty".to_string(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> ReserveMarkers {
        ReserveMarkers::embedded().unwrap()
    }

    fn tag(bytes: &[u8]) -> Option<&[u8]> {
        Some(bytes)
    }

    #[test]
    fn test_plain_marker_is_normal() {
        let markers = markers();
        assert_eq!(markers.classify(tag(b"safe")), OutputClass::Normal);
    }

    #[test]
    fn test_one_byte_off_is_foreign() {
        let markers = markers();
        let mut bytes = markers.plain().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert_eq!(markers.classify(tag(&bytes)), OutputClass::Foreign);

        // Longer than the plain marker but not under a system prefix
        assert_eq!(markers.classify(tag(b"safe!")), OutputClass::Foreign);
    }

    #[test]
    fn test_system_markers() {
        let markers = markers();
        assert_eq!(markers.classify(tag(b"coinbase")), OutputClass::SystemReward);
        assert_eq!(markers.classify(tag(b"safespos")), OutputClass::SystemReward);
    }

    #[test]
    fn test_annotated_system_prefix() {
        let markers = markers();
        let mut bytes = hex::decode(
            "736166650100c9dcee22bb18bd289bca86e2c8bbb6487089adc9a13d875e538dd35c70a6bea42c0100000a02010012",
        )
        .unwrap();
        assert_eq!(markers.classify(tag(&bytes)), OutputClass::SystemReward);
        bytes.extend_from_slice(b"annotation payload");
        assert_eq!(markers.classify(tag(&bytes)), OutputClass::SystemReward);
    }

    #[test]
    fn test_missing_or_empty_tag_is_normal() {
        let markers = markers();
        assert_eq!(markers.classify(None), OutputClass::Normal);
        assert_eq!(markers.classify(tag(&[])), OutputClass::Normal);
    }

    #[test]
    fn test_markers_come_from_config() {
        let markers = ReserveMarkers::from_toml_str(
            r#"
            plain = "aa"
            system = ["bb"]
            system_prefixes = ["cc01"]
            "#,
        )
        .unwrap();
        assert_eq!(markers.classify(tag(&[0xaa])), OutputClass::Normal);
        assert_eq!(markers.classify(tag(&[0xbb])), OutputClass::SystemReward);
        assert_eq!(markers.classify(tag(&[0xcc, 0x01, 0xff])), OutputClass::SystemReward);
        assert_eq!(markers.classify(tag(b"safe")), OutputClass::Foreign);
    }

    #[test]
    fn test_bad_marker_hex_is_rejected() {
        let err = ReserveMarkers::from_toml_str(r#"plain = "xyz""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMarker { .. }));

        let err = ReserveMarkers::from_toml_str(r#"plain = """#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMarker { .. }));
    }
}
