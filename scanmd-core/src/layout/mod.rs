pub mod element;
pub mod page;
