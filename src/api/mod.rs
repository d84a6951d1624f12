//! Clients for the Yoto OAuth endpoints.
pub mod yoto;
pub mod yoto_auth;
