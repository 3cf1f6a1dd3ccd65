/**
 * Services Module
 * Domain logic behind the route handlers
 */

pub mod auth;
pub mod catalog;
pub mod history;
pub mod notify;
pub mod password;
pub mod profile;
pub mod token;
