//! Database access: connection pooling and MySQL trait implementations

pub mod connection;
pub mod mysql;
