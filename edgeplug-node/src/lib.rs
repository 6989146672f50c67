//! Part of [edgeplug](https://github.com/edgeplug/edgeplug), a
//! [Sparkplug](https://sparkplug.eclipse.org/) edge node client library.
//!
//! The protocol session client: connection lifecycle, sequence-number
//! bookkeeping, BIRTH/DEATH choreography, payload compression and command
//! topic routing for one edge node.

mod compression;
mod config;
mod session;

pub use compression::{
    maybe_compress_payload, maybe_decompress_payload, Algorithm, CompressionError, PayloadOptions,
};
pub use config::{ConfigError, SessionBuilder};
pub use session::{is_rebirth_request, PublishError, Session, SessionEvent, SessionHandle};
