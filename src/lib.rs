// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod answer;
pub mod bot;
pub mod config;
pub mod question;
pub mod rational;
pub mod runtime;
pub mod score;
pub mod session;
pub mod timer;
