//! Pluggable encode/decode strategies for stored values.
//!
//! A codec owns both the byte format and the file extension of the saves it
//! produces, so the manager never has to know which concrete codec it holds.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Result, SaveError};

/// Extension used by codecs that do not declare one.
pub const DEFAULT_EXTENSION: &str = ".dat";

/// Serialization strategy used by [`SaveManager`](crate::SaveManager).
pub trait Codec {
    /// Encode `value` into `writer`.
    fn encode<T>(&self, writer: &mut dyn Write, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized;

    /// Decode a value of type `T` from `reader`.
    fn decode<T>(&self, reader: &mut dyn Read) -> Result<T>
    where
        T: DeserializeOwned;

    /// File extension (including the leading dot) for saves written by this codec.
    fn extension(&self) -> &str {
        DEFAULT_EXTENSION
    }
}

/// Compact binary codec backed by bincode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T>(&self, writer: &mut dyn Write, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        bincode::serialize_into(writer, value).map_err(|e| SaveError::Encode(e.to_string()))
    }

    fn decode<T>(&self, reader: &mut dyn Read) -> Result<T>
    where
        T: DeserializeOwned,
    {
        // Slice decoding bounds every length prefix by the bytes actually present.
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        bincode::deserialize(&bytes).map_err(|e| SaveError::Decode(e.to_string()))
    }

    fn extension(&self) -> &str {
        ".bin"
    }
}

/// Human-readable codec backed by serde_json.
///
/// Every document is terminated by a newline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact, single-line output.
    pub const fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented output, easier to inspect by hand.
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Codec for JsonCodec {
    fn encode<T>(&self, writer: &mut dyn Write, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let encoded = if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)
        } else {
            serde_json::to_writer(&mut *writer, value)
        };
        encoded.map_err(|e| SaveError::Encode(e.to_string()))?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn decode<T>(&self, reader: &mut dyn Read) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_reader(reader).map_err(|e| SaveError::Decode(e.to_string()))
    }

    fn extension(&self) -> &str {
        ".json"
    }
}

/// Codec selected at runtime, e.g. from a [`SaveConfig`](crate::SaveConfig).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecKind {
    Bincode,
    #[default]
    Json,
    JsonPretty,
}

impl Codec for CodecKind {
    fn encode<T>(&self, writer: &mut dyn Write, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match self {
            CodecKind::Bincode => BincodeCodec.encode(writer, value),
            CodecKind::Json => JsonCodec::new().encode(writer, value),
            CodecKind::JsonPretty => JsonCodec::pretty().encode(writer, value),
        }
    }

    fn decode<T>(&self, reader: &mut dyn Read) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            CodecKind::Bincode => BincodeCodec.decode(reader),
            CodecKind::Json | CodecKind::JsonPretty => JsonCodec::new().decode(reader),
        }
    }

    fn extension(&self) -> &str {
        match self {
            CodecKind::Bincode => BincodeCodec.extension(),
            CodecKind::Json | CodecKind::JsonPretty => ".json",
        }
    }
}
