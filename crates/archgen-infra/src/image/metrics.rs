//! Perceptual metrics: gradient hash distance and windowed SSIM.
//!
//! Both measures run on a common grayscale working size so differently
//! sized renders stay comparable. The hash uses img_hash's Gradient
//! algorithm at the default 64-bit size; SSIM is the standard windowed
//! mean over 8x8 blocks with the usual stabilizing constants.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use img_hash::{HashAlg, HasherConfig};

use archgen_core::drift::ImageMetrics;
use archgen_types::error::MetricsError;

use super::fetch::ImageFetcher;

/// Working size both images are resampled to before comparison.
const WORKING_SIZE: u32 = 256;

/// SSIM window edge in pixels.
const SSIM_WINDOW: u32 = 8;

/// Stabilizing constants for 8-bit dynamic range.
const C1: f64 = 6.5025; // (0.01 * 255)^2
const C2: f64 = 58.5225; // (0.03 * 255)^2

/// Perceptual comparison backed by an [`ImageFetcher`].
#[derive(Clone)]
pub struct PerceptualMetrics<F> {
    fetcher: F,
}

impl<F: ImageFetcher> PerceptualMetrics<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    async fn load(&self, url: &str) -> Result<DynamicImage, MetricsError> {
        let bytes = self.fetcher.fetch(url).await?;
        image::load_from_memory(&bytes).map_err(|e| MetricsError::Decode(e.to_string()))
    }

    async fn load_pair(
        &self,
        a_url: &str,
        b_url: &str,
    ) -> Result<(DynamicImage, DynamicImage), MetricsError> {
        let a = self.load(a_url).await?;
        let b = self.load(b_url).await?;
        Ok((a, b))
    }
}

impl<F: ImageFetcher> ImageMetrics for PerceptualMetrics<F> {
    async fn phash_distance(&self, a_url: &str, b_url: &str) -> Result<u32, MetricsError> {
        let (a, b) = self.load_pair(a_url, b_url).await?;

        let hasher = HasherConfig::new().hash_alg(HashAlg::Gradient).to_hasher();
        let hash_a = hasher.hash_image(&a);
        let hash_b = hasher.hash_image(&b);
        Ok(hash_a.dist(&hash_b))
    }

    async fn ssim(&self, a_url: &str, b_url: &str) -> Result<f64, MetricsError> {
        let (a, b) = self.load_pair(a_url, b_url).await?;
        let a = normalized_gray(&a);
        let b = normalized_gray(&b);
        Ok(mean_ssim(&a, &b))
    }
}

/// Grayscale at the common working size.
fn normalized_gray(img: &DynamicImage) -> GrayImage {
    image::imageops::resize(
        &img.to_luma8(),
        WORKING_SIZE,
        WORKING_SIZE,
        FilterType::Triangle,
    )
}

/// Mean SSIM over non-overlapping windows. Inputs must share dimensions.
fn mean_ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    let (width, height) = a.dimensions();
    let mut total = 0.0;
    let mut windows = 0u32;

    let mut y = 0;
    while y + SSIM_WINDOW <= height {
        let mut x = 0;
        while x + SSIM_WINDOW <= width {
            total += window_ssim(a, b, x, y);
            windows += 1;
            x += SSIM_WINDOW;
        }
        y += SSIM_WINDOW;
    }

    if windows == 0 { 1.0 } else { total / windows as f64 }
}

fn window_ssim(a: &GrayImage, b: &GrayImage, x0: u32, y0: u32) -> f64 {
    let n = (SSIM_WINDOW * SSIM_WINDOW) as f64;

    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for dy in 0..SSIM_WINDOW {
        for dx in 0..SSIM_WINDOW {
            sum_a += a.get_pixel(x0 + dx, y0 + dy)[0] as f64;
            sum_b += b.get_pixel(x0 + dx, y0 + dy)[0] as f64;
        }
    }
    let mean_a = sum_a / n;
    let mean_b = sum_b / n;

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut covar = 0.0;
    for dy in 0..SSIM_WINDOW {
        for dx in 0..SSIM_WINDOW {
            let da = a.get_pixel(x0 + dx, y0 + dy)[0] as f64 - mean_a;
            let db = b.get_pixel(x0 + dx, y0 + dy)[0] as f64 - mean_b;
            var_a += da * da;
            var_b += db * db;
            covar += da * db;
        }
    }
    var_a /= n - 1.0;
    var_b /= n - 1.0;
    covar /= n - 1.0;

    ((2.0 * mean_a * mean_b + C1) * (2.0 * covar + C2))
        / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2))
}
