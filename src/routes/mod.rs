pub mod admin;
pub mod common;
pub mod customer;
pub mod serviceman;
