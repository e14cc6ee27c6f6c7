pub mod analyze;
pub mod chunk;
pub mod finalize;
pub mod merge;
pub mod parse;
pub mod summarize;
pub mod validate;

pub use analyze::*;
pub use chunk::*;
pub use finalize::*;
pub use merge::*;
pub use parse::*;
pub use summarize::*;
pub use validate::*;
