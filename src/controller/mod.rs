pub mod favorites;
pub mod user;
