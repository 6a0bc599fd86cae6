pub mod channels;
pub mod render;
pub mod risks;
pub mod topology;

pub use channels::*;
pub use render::*;
pub use topology::*;
