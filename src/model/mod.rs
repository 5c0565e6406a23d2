//! The digit classifier: a small fully-connected network over f32
//!
//! Three dense layers with ReLU between them and a softmax on the output,
//! mapping a 784-pixel column to 10 class probabilities.

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::preprocess::IMAGE_PIXELS;
use crate::{Error, Result};

pub mod weights;

/// Number of output classes (digits 0-9).
pub const NUM_CLASSES: usize = 10;

/// A single fully-connected layer: `z = W·x + b`.
#[derive(Debug, Clone)]
pub struct Dense {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl Dense {
    pub fn new(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self> {
        if weights.nrows() != bias.len() {
            return Err(Error::model_load(format!(
                "bias length {} does not match weight rows {}",
                bias.len(),
                weights.nrows()
            )));
        }
        Ok(Self { weights, bias })
    }

    pub fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.weights.nrows()
    }

    fn apply(&self, input: &Array1<f32>) -> Array1<f32> {
        self.weights.dot(input) + &self.bias
    }
}

/// The full network: dense layers with ReLU activations, softmax output.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Dense>,
}

impl Network {
    /// Assemble a network, validating the layer shape chain.
    pub fn new(layers: Vec<Dense>) -> Result<Self> {
        let first = layers
            .first()
            .ok_or_else(|| Error::model_load("network has no layers"))?;

        if first.input_dim() != IMAGE_PIXELS {
            return Err(Error::model_load(format!(
                "first layer expects {} inputs, the image has {} pixels",
                first.input_dim(),
                IMAGE_PIXELS
            )));
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[1].input_dim() != pair[0].output_dim() {
                return Err(Error::model_load(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i + 1,
                    pair[1].input_dim(),
                    i,
                    pair[0].output_dim()
                )));
            }
        }

        let last = layers
            .last()
            .ok_or_else(|| Error::model_load("network has no layers"))?;

        if last.output_dim() != NUM_CLASSES {
            return Err(Error::model_load(format!(
                "output layer produces {} values, expected {}",
                last.output_dim(),
                NUM_CLASSES
            )));
        }

        Ok(Self { layers })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Run the forward pass on a preprocessed input column.
    pub fn forward(&self, input: &Array1<f32>) -> Result<Prediction> {
        if input.len() != IMAGE_PIXELS {
            return Err(Error::invalid_input(format!(
                "expected {} pixels, got {}",
                IMAGE_PIXELS,
                input.len()
            )));
        }

        let mut activation = input.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            let z = layer.apply(&activation);
            activation = if i + 1 < self.layers.len() {
                relu(z)
            } else {
                softmax(&z)
            };
        }

        let (digit, confidence) = argmax(&activation);
        Ok(Prediction {
            prediction: digit,
            confidence,
            probabilities: activation.to_vec(),
        })
    }
}

/// Result of one classification.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub prediction: usize,
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// The fixed response served before a trained model is available.
    pub fn placeholder() -> Self {
        Self {
            prediction: 5,
            confidence: 0.85,
            probabilities: vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.85, 0.1, 0.1, 0.1, 0.1],
        }
    }
}

/// What the API serves: a trained network, or the placeholder stub.
#[derive(Debug)]
pub enum Classifier {
    Trained(Network),
    Placeholder,
}

impl Classifier {
    pub fn predict(&self, input: &Array1<f32>) -> Result<Prediction> {
        match self {
            Classifier::Trained(network) => network.forward(input),
            Classifier::Placeholder => Ok(Prediction::placeholder()),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, Classifier::Trained(_))
    }
}

fn relu(mut v: Array1<f32>) -> Array1<f32> {
    v.mapv_inplace(|x| x.max(0.0));
    v
}

/// Numerically stable softmax: shift by the maximum before exponentiating.
fn softmax(v: &Array1<f32>) -> Array1<f32> {
    let max = v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = v.mapv(|x| (x - max).exp());
    let sum: f32 = exp.sum();
    exp / sum
}

fn argmax(probs: &Array1<f32>) -> (usize, f32) {
    let mut best = 0;
    let mut best_val = f32::NEG_INFINITY;
    for (i, &p) in probs.iter().enumerate() {
        if p > best_val {
            best = i;
            best_val = p;
        }
    }
    (best, best_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn single_layer_network() -> Network {
        // Row d of the weight matrix picks out pixel d, so the brightest of
        // the first ten pixels wins.
        let mut w = Array2::zeros((NUM_CLASSES, IMAGE_PIXELS));
        for d in 0..NUM_CLASSES {
            w[[d, d]] = 1.0;
        }
        Network::new(vec![Dense::new(w, Array1::zeros(NUM_CLASSES)).unwrap()]).unwrap()
    }

    #[test]
    fn relu_clamps_negatives() {
        let out = relu(array![-1.0, 0.0, 2.5]);
        assert_eq!(out, array![0.0, 0.0, 2.5]);
    }

    #[test]
    fn softmax_sums_to_one() {
        let out = softmax(&array![1.0, 2.0, 3.0]);
        let sum: f32 = out.sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(out[2] > out[1] && out[1] > out[0]);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let out = softmax(&array![1000.0, 1001.0]);
        assert!(out.iter().all(|p| p.is_finite()));
        assert!((out.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn argmax_picks_highest() {
        let (idx, val) = argmax(&array![0.1, 0.7, 0.2]);
        assert_eq!(idx, 1);
        assert!((val - 0.7).abs() < 1e-6);
    }

    #[test]
    fn forward_predicts_the_hot_pixel() {
        let network = single_layer_network();
        let mut input = Array1::zeros(IMAGE_PIXELS);
        input[3] = 1.0;

        let prediction = network.forward(&input).unwrap();
        assert_eq!(prediction.prediction, 3);
        let sum: f32 = prediction.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((prediction.confidence - prediction.probabilities[3]).abs() < 1e-6);
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let network = single_layer_network();
        let err = network.forward(&Array1::zeros(10)).unwrap_err();
        assert!(err.to_string().contains("784"));
    }

    #[test]
    fn layer_chain_mismatch_is_rejected() {
        let l1 = Dense::new(Array2::zeros((16, IMAGE_PIXELS)), Array1::zeros(16)).unwrap();
        let l2 = Dense::new(Array2::zeros((NUM_CLASSES, 32)), Array1::zeros(NUM_CLASSES)).unwrap();
        assert!(Network::new(vec![l1, l2]).is_err());
    }

    #[test]
    fn output_layer_must_have_ten_classes() {
        let l1 = Dense::new(Array2::zeros((9, IMAGE_PIXELS)), Array1::zeros(9)).unwrap();
        assert!(Network::new(vec![l1]).is_err());
    }

    #[test]
    fn bias_length_must_match_rows() {
        assert!(Dense::new(Array2::zeros((4, 8)), Array1::zeros(3)).is_err());
    }

    #[test]
    fn placeholder_matches_the_stub_literal() {
        let p = Prediction::placeholder();
        assert_eq!(p.prediction, 5);
        assert!((p.confidence - 0.85).abs() < 1e-6);
        assert_eq!(p.probabilities.len(), NUM_CLASSES);
        assert!((p.probabilities[5] - 0.85).abs() < 1e-6);
    }
}
