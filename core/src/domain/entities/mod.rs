//! Domain entities representing core business objects.

pub mod category;
pub mod order;
pub mod product;
pub mod role;
pub mod token;
pub mod user;
pub mod user_profile;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

// Re-export commonly used types
pub use category::Category;
pub use order::{Order, OrderItem, OrderStatus};
pub use product::Product;
pub use role::{Role, UserRole, DEFAULT_ROLE};
pub use token::Claims;
pub use user::User;
pub use user_profile::UserProfile;

/// Current time at the precision the store keeps (microseconds)
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Money is always kept at exactly two decimal places
pub(crate) fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}
