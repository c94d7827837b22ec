mod cart;
mod order;
mod product;

pub use self::cart::CartRepository;
pub use self::order::{OrderCommandRepository, OrderQueryRepository};
pub use self::product::ProductCatalogRepository;
