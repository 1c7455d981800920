/// Middleware modules for the API server
///
/// Authentication is a `from_fn` layer in [`crate::app`]; this module holds
/// the tower layers that don't need application state.

pub mod security;
