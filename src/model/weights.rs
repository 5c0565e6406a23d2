//! Weights file loading
//!
//! The on-disk format is a single JSON document with `W1`/`b1` through
//! `W3`/`b3`, the same object shape the browser build of the model consumed.
//! Matrices are nested arrays; biases may be flat or column form.

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::{Dense, Network};
use crate::{Error, Result};

type Matrix = Vec<Vec<f32>>;

#[derive(Debug, Deserialize)]
pub struct WeightsFile {
    #[serde(rename = "W1")]
    w1: Matrix,
    #[serde(rename = "b1")]
    b1: Bias,
    #[serde(rename = "W2")]
    w2: Matrix,
    #[serde(rename = "b2")]
    b2: Bias,
    #[serde(rename = "W3")]
    w3: Matrix,
    #[serde(rename = "b3")]
    b3: Bias,
}

/// Bias vectors appear both as `[f32]` and as `[[f32]]` with one element per
/// row, depending on which export produced the file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Bias {
    Flat(Vec<f32>),
    Column(Vec<Vec<f32>>),
}

impl Bias {
    fn into_array(self, name: &str) -> Result<Array1<f32>> {
        match self {
            Bias::Flat(values) => Ok(Array1::from(values)),
            Bias::Column(rows) => {
                let mut values = Vec::with_capacity(rows.len());
                for (i, row) in rows.iter().enumerate() {
                    if row.len() != 1 {
                        return Err(Error::model_load(format!(
                            "{}: column bias row {} has {} elements, expected 1",
                            name,
                            i,
                            row.len()
                        )));
                    }
                    values.push(row[0]);
                }
                Ok(Array1::from(values))
            }
        }
    }
}

fn into_matrix(name: &str, rows: Matrix) -> Result<Array2<f32>> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    if nrows == 0 || ncols == 0 {
        return Err(Error::model_load(format!("{}: empty matrix", name)));
    }

    let mut flat = Vec::with_capacity(nrows * ncols);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != ncols {
            return Err(Error::model_load(format!(
                "{}: row {} has {} columns, expected {}",
                name,
                i,
                row.len(),
                ncols
            )));
        }
        flat.extend(row);
    }

    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| Error::model_load(format!("{}: {}", name, e)))
}

impl WeightsFile {
    /// Build the network, validating every shape along the way.
    pub fn into_network(self) -> Result<Network> {
        let layers = vec![
            Dense::new(into_matrix("W1", self.w1)?, self.b1.into_array("b1")?)?,
            Dense::new(into_matrix("W2", self.w2)?, self.b2.into_array("b2")?)?,
            Dense::new(into_matrix("W3", self.w3)?, self.b3.into_array("b3")?)?,
        ];
        Network::new(layers)
    }
}

/// Load and validate a weights file from disk.
pub fn load_network(path: &Path) -> Result<Network> {
    let data = fs::read(path)?;
    let file: WeightsFile = serde_json::from_slice(&data)?;
    file.into_network()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NUM_CLASSES;
    use crate::preprocess::IMAGE_PIXELS;
    use serde_json::json;

    fn weights_json(hidden1: usize, hidden2: usize) -> serde_json::Value {
        json!({
            "W1": vec![vec![0.0f32; IMAGE_PIXELS]; hidden1],
            "b1": vec![0.0f32; hidden1],
            "W2": vec![vec![0.0f32; hidden1]; hidden2],
            "b2": vec![0.0f32; hidden2],
            "W3": vec![vec![0.0f32; hidden2]; NUM_CLASSES],
            "b3": vec![0.0f32; NUM_CLASSES],
        })
    }

    #[test]
    fn valid_weights_build_a_network() {
        let file: WeightsFile = serde_json::from_value(weights_json(16, 8)).unwrap();
        let network = file.into_network().unwrap();
        assert_eq!(network.num_layers(), 3);
    }

    #[test]
    fn column_form_bias_is_accepted() {
        let mut doc = weights_json(4, 3);
        doc["b1"] = json!(vec![vec![0.5f32]; 4]);

        let file: WeightsFile = serde_json::from_value(doc).unwrap();
        assert!(file.into_network().is_ok());
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let mut doc = weights_json(4, 3);
        doc["W2"][2] = json!([0.0, 0.0, 0.0, 0.0, 0.0]);

        let file: WeightsFile = serde_json::from_value(doc).unwrap();
        let err = file.into_network().unwrap_err();
        assert!(err.to_string().contains("W2"));
    }

    #[test]
    fn shape_chain_mismatch_is_rejected() {
        let mut doc = weights_json(4, 3);
        doc["W2"] = json!(vec![vec![0.0f32; 7]; 3]);

        let file: WeightsFile = serde_json::from_value(doc).unwrap();
        assert!(file.into_network().is_err());
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let mut doc = weights_json(4, 3);
        doc["W3"] = json!([]);

        let file: WeightsFile = serde_json::from_value(doc).unwrap();
        let err = file.into_network().unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
