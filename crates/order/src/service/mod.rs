mod cart;
mod checkout;
mod entitlement;
mod order;
mod payment;
mod transition;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::cart::CartService;
pub use self::checkout::{CheckoutService, CheckoutServiceDeps};
pub use self::entitlement::EntitlementService;
pub use self::order::{OrderCommandService, OrderQueryService};
pub use self::payment::{PaymentService, PaymentServiceDeps};
