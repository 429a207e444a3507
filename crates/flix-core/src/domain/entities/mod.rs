//! Catalogue entities.

mod actor;
mod director;
mod genre;
mod movie;
mod review;
mod user;
mod watchlist;

pub use actor::Actor;
pub use director::Director;
pub use genre::Genre;
pub use movie::Movie;
pub use review::Review;
pub use user::User;
pub use watchlist::Watchlist;
