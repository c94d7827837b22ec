pub mod cart;
pub mod checkout;
pub mod entitlement;
pub mod order;
pub mod payment;
pub mod product;
