pub mod repository;

pub use repository::ProductRepository;
