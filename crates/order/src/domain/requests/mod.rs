pub mod cart;
pub mod checkout;
pub mod order;

pub use self::cart::{AddCartItemsRequest, CartItemRequest, SetQuantityRequest, SetSelectedRequest};
pub use self::checkout::{CheckoutItemRequest, CheckoutRequest, RequestOrigin};
pub use self::order::{FindOrdersQuery, UpdateOrderStatusRequest};
