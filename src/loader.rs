pub mod parser;
pub mod store;
