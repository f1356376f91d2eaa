//! `data:` URIs carrying the exported image

use crate::rendering::Screenshot;
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri(String);

impl DataUri {
    /// Base64-encode `bytes` as a `data:<mime>;base64,` URI.
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        DataUri(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    /// PNG data URI for a screenshot. A tainted screenshot cannot be exported.
    pub fn from_screenshot(shot: &Screenshot) -> Result<Self> {
        if shot.tainted {
            return Err(Error::ExportError(
                "the canvas has been tainted by cross-origin data and cannot be exported".into(),
            ));
        }
        if shot.png_data.is_empty() {
            return Err(Error::ExportError("screenshot has no PNG data".into()));
        }
        Ok(DataUri::encode(PNG_MIME, &shot.png_data))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let uri = DataUri(s.to_string());
        uri.split()?;
        Ok(uri)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime(&self) -> Result<&str> {
        self.split().map(|(mime, _)| mime)
    }

    /// Decoded payload bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, payload) = self.split()?;
        STANDARD
            .decode(payload)
            .map_err(|e| Error::ExportError(format!("invalid base64 payload: {}", e)))
    }

    fn split(&self) -> Result<(&str, &str)> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| Error::ExportError("not a data URI".into()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::ExportError("data URI has no payload".into()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| Error::ExportError("only base64 data URIs are supported".into()))?;
        Ok((mime, payload))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
