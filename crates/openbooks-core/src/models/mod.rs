pub mod book;
pub mod category;

pub use book::*;
pub use category::*;
