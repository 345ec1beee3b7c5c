pub mod auth;
pub mod bots;
pub mod dashboard;
pub mod launches;
pub mod pages;
pub mod routes;
pub mod session;
pub mod utils;
pub mod wallets;
