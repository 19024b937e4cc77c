//! Domain entities: the note message model, key names, normalization,
//! transport configuration, and device subscriptions.

pub mod devices;
pub mod key_name;
pub mod normalize;
pub mod note;
pub mod transport;
