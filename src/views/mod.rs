//! Views: routing, pages and the terminal shell

pub mod mount;
pub mod pages;
pub mod render;
pub mod router;
pub mod shell;

pub use router::{AuthState, Resolution, Route, Router};
pub use shell::Shell;
