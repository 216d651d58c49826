//! Repositories and the unit of work that binds them to one store session.

pub mod category;
pub mod generic;
pub mod order;
pub mod product;
pub mod unit_of_work;
pub mod user;

#[cfg(test)]
mod tests;

pub use category::CategoryRepository;
pub use generic::{Queryable, Repository};
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use unit_of_work::{Staged, UnitOfWork, UnitOfWorkFactory, UnitState};
pub use user::UserRepository;
