mod analyze;
mod info;
mod serve;

pub use analyze::cmd_analyze;
pub use info::cmd_info;
pub use serve::cmd_serve;
