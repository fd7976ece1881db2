//! neurite-nn: a minimal tensor-algebra engine and hand-rolled
//! feed-forward network building blocks.
//!
//! The `math` module provides a fixed-rank strided tensor container with
//! broadcasting arithmetic and 2D/3D matrix products. On top of it,
//! `layers`, `losses` and `optimizers` define a small trait protocol with
//! manual reverse-mode gradients, and `network` wires a layer stack into
//! a trainable model.
//!
//! Everything runs single-threaded on the CPU. The layer stack is
//! monomorphic over `f32`; the tensor container itself stays generic
//! over the element type.
pub mod config;
pub mod init;
pub mod layers;
pub mod losses;
pub mod math;
pub mod network;
pub mod optimizers;
