//! Image based surface brightness profiles

use nalgebra::DMatrix;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("cannot build a profile from an empty image")]
    EmptyImage,
    #[error("the image pixel scale must be positive, found {0}")]
    PixelScale(f64),
    #[error("the image contains non finite values")]
    NonFinite,
}
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Profiles that are built from a sampled image
pub trait ProfileFromImage: Sized {
    /// Builds the profile from an image and its pixel scale
    fn from_image(image: DMatrix<f64>, scale: f64) -> Result<Self>;
}

/// A surface brightness profile sampled on a regular grid
///
/// The origin of the profile is at the pixel `(n_rows/2, n_cols/2)`; `x` runs along
/// the columns and `y` along the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledProfile {
    image: DMatrix<f64>,
    scale: f64,
}
impl ProfileFromImage for SampledProfile {
    fn from_image(image: DMatrix<f64>, scale: f64) -> Result<Self> {
        if image.is_empty() {
            return Err(ProfileError::EmptyImage);
        }
        if !(scale.is_finite() && scale > 0.) {
            return Err(ProfileError::PixelScale(scale));
        }
        if image.iter().any(|x| !x.is_finite()) {
            return Err(ProfileError::NonFinite);
        }
        Ok(Self { image, scale })
    }
}
impl SampledProfile {
    /// Surface brightness samples
    pub fn image(&self) -> &DMatrix<f64> {
        &self.image
    }
    pub fn into_image(self) -> DMatrix<f64> {
        self.image
    }
    /// Pixel scale
    pub fn pixel_scale(&self) -> f64 {
        self.scale
    }
    /// Image shape `(n_rows,n_cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.image.shape()
    }
    /// Total flux: the integral of the surface brightness
    pub fn flux(&self) -> f64 {
        self.image.sum() * self.scale * self.scale
    }
    /// Maximum surface brightness
    pub fn peak(&self) -> f64 {
        self.image.max()
    }
    /// Flux weighted center `(x,y)` in pixel scale units
    pub fn centroid(&self) -> (f64, f64) {
        let (n_rows, n_cols) = self.image.shape();
        let (i0, j0) = ((n_rows / 2) as f64, (n_cols / 2) as f64);
        let total = self.image.sum();
        let (mut x, mut y) = (0f64, 0f64);
        for j in 0..n_cols {
            for i in 0..n_rows {
                let v = self.image[(i, j)];
                x += v * (j as f64 - j0);
                y += v * (i as f64 - i0);
            }
        }
        (self.scale * x / total, self.scale * y / total)
    }
    /// Full width at half maximum in pixel scale units
    ///
    /// Estimated from the area of the pixels brighter than half the peak, assuming
    /// a circular profile.
    pub fn fwhm(&self) -> f64 {
        let half_max = 0.5 * self.peak();
        let area = self.image.iter().filter(|&&x| x >= half_max).count() as f64;
        2. * (area / std::f64::consts::PI).sqrt() * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_moments() {
        let sigma = 3f64;
        let image = DMatrix::from_fn(64, 64, |i, j| {
            let (x, y) = (j as f64 - 34., i as f64 - 32.);
            (-(x * x + y * y) / (2. * sigma * sigma)).exp()
        });
        let profile = SampledProfile::from_image(image, 0.5).unwrap();
        let flux = 2. * std::f64::consts::PI * sigma * sigma * 0.25;
        assert!((profile.flux() - flux).abs() / flux < 1e-6);
        let (x, y) = profile.centroid();
        assert!((x - 1.).abs() < 1e-9, "{x}");
        assert!(y.abs() < 1e-9, "{y}");
        let fwhm = 2. * (2. * 2f64.ln()).sqrt() * sigma * 0.5;
        assert!((profile.fwhm() - fwhm).abs() / fwhm < 0.1);
        let peak = profile.peak();
        let image = profile.into_image();
        assert_eq!(image[(32, 34)], peak);
    }

    #[test]
    fn invalid_images() {
        assert_eq!(
            SampledProfile::from_image(DMatrix::zeros(0, 0), 1.).unwrap_err(),
            ProfileError::EmptyImage
        );
        assert_eq!(
            SampledProfile::from_image(DMatrix::zeros(2, 2), 0.).unwrap_err(),
            ProfileError::PixelScale(0.)
        );
        let mut image = DMatrix::zeros(2, 2);
        image[(1, 1)] = f64::NAN;
        assert_eq!(
            SampledProfile::from_image(image, 1.).unwrap_err(),
            ProfileError::NonFinite
        );
    }
}
