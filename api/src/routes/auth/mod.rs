//! Session lifecycle endpoints: login, refresh, logout

pub mod login;
pub mod logout;
pub mod refresh;
