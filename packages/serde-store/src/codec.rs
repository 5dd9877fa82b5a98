//! YAML and JSON codec implementations.

use dotconf_core::{Codec, Error, Format, Value};

use crate::convert::{first_non_finite, json_to_value, value_to_json, value_to_yaml, yaml_to_value};

/// A codec that handles YAML documents.
///
/// This is the default codec for config files. Mapping order is preserved in
/// both directions and duplicate keys are rejected as malformed.
///
/// # Example
///
/// ```rust
/// use dotconf_serde::YamlCodec;
/// use dotconf_core::{Codec, Format, Value};
///
/// let codec = YamlCodec;
/// let value = codec.decode("motd: hello\n", &Format::YAML).unwrap();
/// let text = codec.encode(&value, &Format::YAML).unwrap();
///
/// assert_eq!(text, "motd: hello\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn decode(&self, text: &str, format: &Format) -> Result<Value, Error> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.clone()));
        }

        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| Error::malformed(format, e.to_string()))?;

        yaml_to_value(yaml).map_err(|message| Error::malformed(format, message))
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<String, Error> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.clone()));
        }

        let yaml = value_to_yaml(value.clone());
        serde_yaml::to_string(&yaml).map_err(|e| Error::encode(format, e.to_string()))
    }

    fn supports(&self, format: &Format) -> bool {
        format == &Format::YAML
    }
}

/// A codec that handles JSON documents, pretty-printed on encode.
///
/// Documents holding NaN or infinite floats cannot be encoded, since JSON
/// has no representation for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, text: &str, format: &Format) -> Result<Value, Error> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.clone()));
        }

        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::malformed(format, e.to_string()))?;

        Ok(json_to_value(json))
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<String, Error> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.clone()));
        }

        if let Some(at) = first_non_finite(value) {
            return Err(Error::encode(
                format,
                format!("non-finite number at {:?}", at),
            ));
        }

        let json = value_to_json(value.clone());
        let mut text =
            serde_json::to_string_pretty(&json).map_err(|e| Error::encode(format, e.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    fn supports(&self, format: &Format) -> bool {
        format == &Format::JSON
    }
}

/// A codec that combines multiple codecs.
///
/// Routes encode/decode to the first codec that supports the format.
pub struct MultiCodec {
    codecs: Vec<Box<dyn Codec>>,
}

impl MultiCodec {
    /// Create an empty multi-codec.
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Add a codec.
    pub fn add(&mut self, codec: impl Codec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    /// Create a multi-codec with the YAML and JSON codecs included.
    pub fn with_defaults() -> Self {
        let mut mc = Self::new();
        mc.add(YamlCodec);
        mc.add(JsonCodec);
        mc
    }
}

impl Default for MultiCodec {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Codec for MultiCodec {
    fn decode(&self, text: &str, format: &Format) -> Result<Value, Error> {
        for codec in &self.codecs {
            if codec.supports(format) {
                return codec.decode(text, format);
            }
        }
        Err(Error::UnsupportedFormat(format.clone()))
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<String, Error> {
        for codec in &self.codecs {
            if codec.supports(format) {
                return codec.encode(value, format);
            }
        }
        Err(Error::UnsupportedFormat(format.clone()))
    }

    fn supports(&self, format: &Format) -> bool {
        self.codecs.iter().any(|c| c.supports(format))
    }
}
