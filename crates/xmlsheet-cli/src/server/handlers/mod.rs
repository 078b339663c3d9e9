//! API request handlers.

mod catalog;
mod export;
mod fields;
mod view;

pub use catalog::*;
pub use export::*;
pub use fields::*;
pub use view::*;
