// Sensors module - channel identities, raw sample shapes, device adapters

pub mod adapters;
pub mod types;

pub use adapters::{field_strength, pseudo_field_from_motion};
pub use types::{ChannelId, ChannelKind, Sample, Vector3};
