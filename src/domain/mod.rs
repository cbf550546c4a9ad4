pub mod contact;
pub mod errors;
pub mod notification;
pub mod order;
pub mod ports;
pub mod product;
pub mod user;
