//! Client code for prerender.
//!
//! This crate provides URL canonicalization, the headless render engine,
//! the cache coordinator, and the expiry sweeper used by the server.

pub mod coordinator;
pub mod render;
pub mod sweep;
pub mod urls;

pub use coordinator::{CacheCoordinator, CachePolicy, Outcome};
#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::{RenderError, RenderOptions, RenderedPage, Renderer, SettlePolicy};
pub use sweep::{ExpirySweeper, SweepStats};
pub use urls::canonicalize;
