pub mod contact;
pub mod message;
pub mod profile;
pub mod result;
pub mod service;

pub use contact::*;
pub use message::*;
pub use profile::*;
pub use result::*;
pub use service::*;
