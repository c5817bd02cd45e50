//! Default pipeline stages.
//!
//! 1. **RenderStage** - Turn each page body into an HTML fragment according to
//!    its format
//! 2. **NormalizeStage** - Apply the structural rewrite rules to each fragment

mod normalize;
mod render;

pub use normalize::NormalizeStage;
pub use render::RenderStage;
