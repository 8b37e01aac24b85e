//! Features Module - Feature Encoding Engine
//!
//! Tách logic encode features khỏi classifier.
//! Must replicate the training-time transform exactly.

pub mod categorical;
pub mod layout;
pub mod numeric;
pub mod pipeline;


// Re-export common types
pub use categorical::{HandleUnknown, OneHotEncoder};
pub use layout::{LayoutInfo, CATEGORICAL_FIELDS, NUMERIC_FIELDS};
pub use numeric::StandardScaler;
pub use pipeline::{encode_with, EncodedMatrix, FeaturePipeline};
