//! Data models for Libris

pub mod book;
pub mod fine;
pub mod order;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use fine::{Fine, FineRecord};
pub use order::{Order, OrderStatus};
pub use user::{User, UserClaims};
