//! Client for the external renderer process.
//!
//! The renderer exposes two POST endpoints (`/render`, `/render/v1`) and
//! writes output files under the shared staging root before responding.
//! Any non-2xx response is an error; there is no retry here.

pub mod client;
pub mod error;
pub mod types;

pub use client::RendererClient;
pub use error::{RendererError, RendererResult};
pub use types::{OutputKeysV0, OutputKeysV1, RenderSpecV0, RenderSpecV1};
