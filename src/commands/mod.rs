pub mod config;
pub mod extract;
pub mod info;
pub mod report;
pub mod run;

pub use self::config::show_config;
pub use self::extract::run_extract;
pub use self::info::show_info;
pub use self::report::run_report;
pub use self::run::run;
