pub mod errors;
pub mod models;
pub mod schema;
pub mod modules;

pub(crate) mod macros {
    pub(crate) mod database_error_handeler;
}
