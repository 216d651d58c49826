//! Value objects assembled from entities for callers.

pub mod auth_response;
pub mod details;

pub use auth_response::AuthResponse;
pub use details::{
    AssignedRole, CategoryDetails, OrderDetails, OrderLine, ProductDetails, UserDetails,
};
