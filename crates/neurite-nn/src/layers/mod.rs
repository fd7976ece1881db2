pub mod activation;
pub mod dense;
pub mod layer_trait;

pub use activation::{ReLU, Sigmoid};
pub use dense::Dense;
pub use layer_trait::Layer;
