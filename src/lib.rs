pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod limiter;
pub mod observability;

// Config environment used when FORMGATE_ENV is unset
pub const DEFAULT_ENV: &str = "local";
