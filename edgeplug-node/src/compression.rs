//! Compressed payload envelopes.
//!
//! A compressed publish wraps the encoded payload bytes in an outer payload
//! whose `uuid` is a fixed marker, whose `body` holds the compressed bytes
//! and whose metrics carry the algorithm name when one was explicitly
//! requested. DEFLATE is the default when no algorithm is named.

use std::io::{Read, Write};
use std::str::FromStr;

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use log::debug;
use thiserror::Error;

use edgeplug_types::constants::{COMPRESSED_PAYLOAD_UUID, COMPRESSION_ALGORITHM_METRIC};
use edgeplug_types::model::{DecodeError, EncodeError, Metric, Payload};
use edgeplug_types::Value;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("unknown or unsupported algorithm {0}")]
    UnknownAlgorithm(String),
    #[error("compression io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Deflate,
    Gzip,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Deflate => "DEFLATE",
            Algorithm::Gzip => "GZIP",
        }
    }
}

impl FromStr for Algorithm {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEFLATE" => Ok(Algorithm::Deflate),
            "GZIP" => Ok(Algorithm::Gzip),
            _ => Err(CompressionError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Per-publish payload options
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayloadOptions {
    pub compress: bool,
    /// Algorithm to compress with; DEFLATE when unset. Setting it also adds
    /// the algorithm metric to the envelope.
    pub algorithm: Option<Algorithm>,
}

fn compress(algorithm: Algorithm, bytes: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let out = match algorithm {
        Algorithm::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(bytes)?;
            encoder.finish()?
        }
        Algorithm::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(bytes)?;
            encoder.finish()?
        }
    };
    Ok(out)
}

fn decompress(algorithm: Algorithm, bytes: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::new();
    match algorithm {
        Algorithm::Deflate => ZlibDecoder::new(bytes).read_to_end(&mut out)?,
        Algorithm::Gzip => GzDecoder::new(bytes).read_to_end(&mut out)?,
    };
    Ok(out)
}

fn compress_payload(
    payload: Payload,
    options: &PayloadOptions,
) -> Result<Payload, CompressionError> {
    debug!("Compressing payload {options:?}");
    let encoded = payload.encode()?;
    let algorithm = options.algorithm;
    let mut envelope = Payload {
        uuid: Some(COMPRESSED_PAYLOAD_UUID.to_string()),
        body: Some(compress(algorithm.unwrap_or(Algorithm::Deflate), &encoded)?),
        ..Default::default()
    };
    /* the algorithm metric is only present when one was explicitly named */
    if let Some(algorithm) = algorithm {
        envelope
            .metrics
            .push(Metric::new(COMPRESSION_ALGORITHM_METRIC, algorithm.as_str()));
    }
    Ok(envelope)
}

/// Compress `payload` into an envelope payload when the options ask for it
pub fn maybe_compress_payload(
    payload: Payload,
    options: &PayloadOptions,
) -> Result<Payload, CompressionError> {
    if options.compress {
        compress_payload(payload, options)
    } else {
        Ok(payload)
    }
}

/// Unwrap a compressed envelope back into the payload it carries.
///
/// Payloads whose uuid is not the marker pass through untouched. The
/// algorithm is taken from the envelope's `algorithm` metric when present,
/// DEFLATE otherwise; an unrecognised algorithm name is a fatal error for
/// this message.
pub fn maybe_decompress_payload(payload: Payload) -> Result<Payload, CompressionError> {
    if payload.uuid.as_deref() != Some(COMPRESSED_PAYLOAD_UUID) {
        return Ok(payload);
    }
    debug!("Decompressing payload");
    let algorithm = match payload
        .metrics
        .iter()
        .find(|m| m.name.as_deref() == Some(COMPRESSION_ALGORITHM_METRIC))
    {
        Some(metric) => match &metric.value {
            Some(Value::String(name)) => name.parse()?,
            _ => Algorithm::Deflate,
        },
        None => Algorithm::Deflate,
    };
    let body = payload.body.unwrap_or_default();
    let bytes = decompress(algorithm, &body)?;
    Ok(Payload::decode(&bytes)?)
}
