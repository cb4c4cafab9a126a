pub mod api;
pub mod cli;
pub mod otp;
pub mod tokens;
