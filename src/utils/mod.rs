pub mod arguments;

pub use arguments::{decode, encode, CallOutput, CodecError, Shape};
