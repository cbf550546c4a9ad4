pub mod auth;
pub mod health;
pub mod orders;
pub mod otp;
pub mod products;
pub mod relay;
