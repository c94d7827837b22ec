mod repository;
mod service;

pub use self::repository::{CartRepositoryTrait, DynCartRepository};
pub use self::service::{CartServiceTrait, DynCartService};
