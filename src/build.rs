mod builder;
mod compose;
pub mod deck;
pub mod diagnostics;
pub mod format;
mod markdown;
mod normalize;
mod paths;
pub mod pipeline;
mod resolve;
mod terse;
mod tree;
mod watch;

pub use builder::Builder;
pub use deck::{Deck, Section};
pub use diagnostics::Severity;
