pub mod friends;
pub mod intros;
pub mod users;
