pub mod api;
pub mod catalog;
pub mod logging;

pub mod util {
    pub mod env;
}
