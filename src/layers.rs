//! Per-layer turbulence parameters
//!
//! Each physical parameter of the atmosphere is given either once for all the layers
//! or once per layer. [broadcast] turns the four parameters into lists of equal length.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayersError {
    #[error(
        "r0 ({r0}), velocity ({velocity}), direction ({direction}), alpha_mag ({alpha_mag}) lengths are not broadcastable"
    )]
    NotBroadcastable {
        r0: usize,
        velocity: usize,
        direction: usize,
        alpha_mag: usize,
    },
    #[error("at least one turbulence layer is required")]
    Empty,
}
pub type Result<T> = std::result::Result<T, LayersError>;

/// A parameter given either for all the layers or for each layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerLayer<T> {
    /// Same value for all the layers
    One(T),
    /// One value per layer
    Each(Vec<T>),
}
impl<T: Clone> PerLayer<T> {
    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            PerLayer::One(_) => 1,
            PerLayer::Each(values) => values.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn to_vec(&self) -> Vec<T> {
        match self {
            PerLayer::One(value) => vec![value.clone()],
            PerLayer::Each(values) => values.clone(),
        }
    }
}
impl From<f64> for PerLayer<f64> {
    fn from(value: f64) -> Self {
        PerLayer::One(value)
    }
}
impl From<Vec<f64>> for PerLayer<f64> {
    fn from(values: Vec<f64>) -> Self {
        PerLayer::Each(values)
    }
}
impl From<&[f64]> for PerLayer<f64> {
    fn from(values: &[f64]) -> Self {
        PerLayer::Each(values.to_vec())
    }
}
impl<const N: usize> From<[f64; N]> for PerLayer<f64> {
    fn from(values: [f64; N]) -> Self {
        PerLayer::Each(values.to_vec())
    }
}

/// A turbulence layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Fried parameter in meters
    pub r0: f64,
    /// Wind speed in m/s
    pub velocity: f64,
    /// Wind direction in radians, counter-clockwise from +x
    pub direction: f64,
    /// Magnitude of the autoregressive parameter
    pub alpha_mag: f64,
}
impl Layer {
    /// Wind velocity components `(vx,vy)` in m/s
    pub fn wind(&self) -> (f64, f64) {
        let (s, c) = self.direction.sin_cos();
        (self.velocity * c, self.velocity * s)
    }
}

/// Layer parameters, all of the same length
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerParameters {
    pub r0: Vec<f64>,
    pub velocity: Vec<f64>,
    pub direction: Vec<f64>,
    pub alpha_mag: Vec<f64>,
}
impl LayerParameters {
    /// Number of turbulence layers
    pub fn n_layer(&self) -> usize {
        self.r0.len()
    }
    /// Iterator over the turbulence layers
    pub fn layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.r0
            .iter()
            .zip(&self.velocity)
            .zip(&self.direction)
            .zip(&self.alpha_mag)
            .map(|(((&r0, &velocity), &direction), &alpha_mag)| Layer {
                r0,
                velocity,
                direction,
                alpha_mag,
            })
    }
}

/// Broadcasts the layer parameters to the same number of layers
///
/// The number of layers is the length of the longest parameter list,
/// parameters of length 1 are repeated as many times as there are layers.
pub fn broadcast(
    r0: &PerLayer<f64>,
    velocity: &PerLayer<f64>,
    direction: &PerLayer<f64>,
    alpha_mag: &PerLayer<f64>,
) -> Result<LayerParameters> {
    let lengths = [r0.len(), velocity.len(), direction.len(), alpha_mag.len()];
    let n_layer = lengths.iter().copied().max().unwrap_or_default();
    if lengths.iter().any(|&n| n == 0) {
        return Err(LayersError::Empty);
    }
    if lengths.iter().any(|&n| n != 1 && n != n_layer) {
        return Err(LayersError::NotBroadcastable {
            r0: lengths[0],
            velocity: lengths[1],
            direction: lengths[2],
            alpha_mag: lengths[3],
        });
    }
    let expand = |p: &PerLayer<f64>| {
        let values = p.to_vec();
        if values.len() == 1 {
            vec![values[0]; n_layer]
        } else {
            values
        }
    };
    Ok(LayerParameters {
        r0: expand(r0),
        velocity: expand(velocity),
        direction: expand(direction),
        alpha_mag: expand(alpha_mag),
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn broadcast_scalars() {
        let params = broadcast(
            &vec![0.2, 0.15].into(),
            &5f64.into(),
            &vec![0., FRAC_PI_2].into(),
            &0.99f64.into(),
        )
        .unwrap();
        assert_eq!(params.n_layer(), 2);
        assert_eq!(params.velocity, vec![5., 5.]);
        assert_eq!(params.alpha_mag, vec![0.99, 0.99]);
        assert_eq!(params.r0, vec![0.2, 0.15]);
    }

    #[test]
    fn single_layer() {
        let params = broadcast(&0.2f64.into(), &0f64.into(), &0f64.into(), &0.999f64.into()).unwrap();
        assert_eq!(params.n_layer(), 1);
    }

    #[test]
    fn not_broadcastable() {
        let err = broadcast(
            &[0.2, 0.15, 0.1].into(),
            &5f64.into(),
            &[0., FRAC_PI_2].into(),
            &0.99f64.into(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayersError::NotBroadcastable {
                r0: 3,
                velocity: 1,
                direction: 2,
                alpha_mag: 1
            }
        );
    }

    #[test]
    fn empty_layer_list() {
        let err = broadcast(
            &PerLayer::Each(vec![]),
            &5f64.into(),
            &0f64.into(),
            &0.99f64.into(),
        )
        .unwrap_err();
        assert_eq!(err, LayersError::Empty);
    }

    #[test]
    fn wind_components() {
        let layer = Layer {
            r0: 0.2,
            velocity: 10.,
            direction: FRAC_PI_2,
            alpha_mag: 0.9,
        };
        let (vx, vy) = layer.wind();
        assert!(vx.abs() < 1e-12);
        assert!((vy - 10.).abs() < 1e-12);
    }
}
