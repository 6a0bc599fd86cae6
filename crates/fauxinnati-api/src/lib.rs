pub mod error;
pub mod handlers;
pub mod health;
pub mod landing;
pub mod routes;
pub mod server;
pub mod state;

pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
