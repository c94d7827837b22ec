pub mod api;
pub mod cart;
pub mod checkout;
pub mod order;
pub mod pagination;
pub mod payment;

pub use self::api::{ApiResponse, ApiResponsePagination};
pub use self::cart::{CartResponse, SelectedCartResponse};
pub use self::checkout::CheckoutResponse;
pub use self::order::OrderResponse;
pub use self::pagination::Pagination;
pub use self::payment::{CallbackResponse, EntitlementResponse, PaymentStatusResponse};
