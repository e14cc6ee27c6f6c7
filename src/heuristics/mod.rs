pub mod contacts;
pub mod noise;

pub use contacts::*;
pub use noise::*;
