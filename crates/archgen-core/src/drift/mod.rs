//! Two-tier drift validation: symbolic (DNA diff) and perceptual
//! (SSIM + perceptual hash distance).

mod metrics;
mod validator;

pub use metrics::ImageMetrics;
pub use validator::DriftValidator;
