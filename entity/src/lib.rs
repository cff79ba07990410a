pub mod chronicle_user;
pub mod favorite;

pub mod prelude {
    pub use super::chronicle_user::Entity as ChronicleUser;
    pub use super::favorite::Entity as Favorite;
}
