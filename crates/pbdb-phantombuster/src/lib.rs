//! Client for the `PhantomBuster` v2 REST API.
//!
//! Only the read endpoints needed to discover agents, enumerate their
//! containers (runs), and download a container's result records are
//! wrapped here.

pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::PhantomBusterClient;
pub use error::PhantomBusterError;
pub use types::{AgentDetail, AgentRef, ContainerDetail, ContainerRef};
