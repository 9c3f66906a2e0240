mod graph;
mod intro_request;
mod user;

pub use graph::*;
pub use intro_request::*;
pub use user::*;
