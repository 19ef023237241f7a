pub mod capabilities;
pub mod common;
pub mod generate;
pub mod order;
