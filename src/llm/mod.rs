pub mod client;
pub mod limiter;
pub mod prompts;
pub mod provider;

pub use client::*;
pub use limiter::*;
pub use prompts::*;
pub use provider::*;
