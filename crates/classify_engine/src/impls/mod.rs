//! [`Classify`](crate::Classify) implementations for foreign types.

mod collections;
mod maps;
mod pointers;
mod primitives;
mod self_value;

pub use maps::KeyValuePair;
pub use primitives::Bytes;
