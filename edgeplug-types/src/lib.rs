//! Part of [edgeplug](https://github.com/edgeplug/edgeplug), a
//! [Sparkplug](https://sparkplug.eclipse.org/) edge node client library.
//!
//! Payload types and codecs: the protobuf wire message set, the typed metric
//! model, packed array representations and the topic grammar.

pub mod array;
pub mod constants;

/// wire types
pub mod payload;

/// typed payload model
pub mod model;

pub mod topic;

pub mod utils;

mod value;

pub use value::*;
