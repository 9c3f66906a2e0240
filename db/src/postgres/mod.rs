mod friend;
mod intro;
mod user;

pub use friend::*;
pub use intro::*;
pub use user::*;
