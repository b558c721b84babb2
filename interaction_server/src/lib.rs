pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::status_port;
pub use frameworks::server::{build_context, run, run_with_config};
