//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint config
//!     → tls.rs (optional certificate/key loading)
//!     → web endpoint binds plain TCP or rustls acceptor
//! ```

pub mod tls;
