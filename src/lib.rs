pub mod bitmap;
pub mod decoder;
pub mod geom;
pub mod shape;
pub mod tags;

pub use decoder::{decode_morph_shape, decode_shape, DecodeError};
