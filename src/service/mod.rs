pub mod favorites;
pub mod retry;
pub mod user;
