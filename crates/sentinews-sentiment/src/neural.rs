//! Single-layer LSTM over word embeddings with a dense softmax head.
//!
//! Weights are read from a JSON artifact. Gate rows are stacked in
//! input, forget, cell, output order, each block `hidden_dim` rows tall, and
//! the head emits logits in `[negative, neutral, positive]` order.

use std::collections::HashMap;
use std::path::Path;

use sentinews_core::{AnalyzerKind, SentimentScore};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::tokenize::{require_text, tokenize};

const CLASSES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralModel {
    /// Token to embedding row. Tokens missing from the vocabulary are skipped.
    pub vocab: HashMap<String, usize>,
    /// `vocab_size x embedding_dim`.
    pub embedding: Vec<Vec<f64>>,
    /// `4*hidden_dim x embedding_dim`.
    pub w_ih: Vec<Vec<f64>>,
    /// `4*hidden_dim x hidden_dim`.
    pub w_hh: Vec<Vec<f64>>,
    /// `4*hidden_dim`.
    pub bias: Vec<f64>,
    /// `3 x hidden_dim`.
    pub w_out: Vec<Vec<f64>>,
    /// `3`.
    pub b_out: Vec<f64>,
    /// Only the first `max_length` known tokens are fed to the network.
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl NeuralModel {
    /// Read and shape-check a JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ModelLoad`] if the file is missing, is not
    /// valid JSON, or has inconsistent tensor shapes.
    pub fn load(path: &Path) -> Result<Self, SentimentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SentimentError::model_load(path, e))?;
        let model: Self =
            serde_json::from_str(&raw).map_err(|e| SentimentError::model_load(path, e))?;
        model
            .check_shapes()
            .map_err(|reason| SentimentError::model_load(path, reason))?;
        Ok(model)
    }

    fn embedding_dim(&self) -> usize {
        self.embedding.first().map_or(0, Vec::len)
    }

    fn hidden_dim(&self) -> usize {
        self.w_hh.first().map_or(0, Vec::len)
    }

    /// Validate every tensor against `embedding_dim` and `hidden_dim`.
    fn check_shapes(&self) -> Result<(), String> {
        let embed = self.embedding_dim();
        let hidden = self.hidden_dim();
        if embed == 0 || hidden == 0 {
            return Err("embedding and hidden dimensions must be non-zero".to_string());
        }

        check_matrix("embedding", &self.embedding, self.embedding.len(), embed)?;
        check_matrix("w_ih", &self.w_ih, 4 * hidden, embed)?;
        check_matrix("w_hh", &self.w_hh, 4 * hidden, hidden)?;
        check_vector("bias", &self.bias, 4 * hidden)?;
        check_matrix("w_out", &self.w_out, CLASSES, hidden)?;
        check_vector("b_out", &self.b_out, CLASSES)?;

        let rows = self.embedding.len();
        if let Some((token, index)) = self.vocab.iter().find(|(_, index)| **index >= rows) {
            return Err(format!(
                "vocab entry '{token}' points at row {index}, embedding has {rows} rows"
            ));
        }
        Ok(())
    }
}

fn check_matrix(name: &str, m: &[Vec<f64>], rows: usize, cols: usize) -> Result<(), String> {
    if m.len() != rows {
        return Err(format!("{name} has {} rows, expected {rows}", m.len()));
    }
    if let Some((i, row)) = m.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(format!(
            "{name} row {i} has {} columns, expected {cols}",
            row.len()
        ));
    }
    if m.iter().flatten().any(|v| !v.is_finite()) {
        return Err(format!("{name} contains a non-finite value"));
    }
    Ok(())
}

fn check_vector(name: &str, v: &[f64], len: usize) -> Result<(), String> {
    if v.len() != len {
        return Err(format!("{name} has length {}, expected {len}", v.len()));
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(format!("{name} contains a non-finite value"));
    }
    Ok(())
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn affine(weights: &[Vec<f64>], input: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .map(|row| row.iter().zip(input).map(|(w, x)| w * x).sum())
        .collect()
}

#[derive(Debug, Clone)]
pub struct NeuralAnalyzer {
    model: NeuralModel,
}

impl NeuralAnalyzer {
    /// # Errors
    ///
    /// See [`NeuralModel::load`].
    pub fn from_path(path: &Path) -> Result<Self, SentimentError> {
        NeuralModel::load(path).map(|model| Self { model })
    }

    /// Wrap an in-memory model after checking its shapes.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ModelLoad`] if the tensors are inconsistent.
    pub fn from_model(model: NeuralModel) -> Result<Self, SentimentError> {
        model
            .check_shapes()
            .map_err(|reason| SentimentError::model_load("<in-memory>", reason))?;
        Ok(Self { model })
    }

    /// Run `text` through the network.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidInput`] for empty or whitespace-only text.
    pub fn evaluate(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        let tokens = tokenize(require_text(text)?);
        let m = &self.model;
        let hidden = m.hidden_dim();

        let mut h = vec![0.0; hidden];
        let mut c = vec![0.0; hidden];

        let rows = tokens
            .iter()
            .filter_map(|t| m.vocab.get(t))
            .take(m.max_length.unwrap_or(usize::MAX));
        for &row in rows {
            let x = &m.embedding[row];
            let wx = affine(&m.w_ih, x);
            let wh = affine(&m.w_hh, &h);
            let gates: Vec<f64> = wx
                .iter()
                .zip(&wh)
                .zip(&m.bias)
                .map(|((a, b), bias)| a + b + bias)
                .collect();

            for j in 0..hidden {
                let input = sigmoid(gates[j]);
                let forget = sigmoid(gates[hidden + j]);
                let cell = gates[2 * hidden + j].tanh();
                let output = sigmoid(gates[3 * hidden + j]);
                c[j] = forget * c[j] + input * cell;
                h[j] = output * c[j].tanh();
            }
        }

        let logits: Vec<f64> = affine(&m.w_out, &h)
            .iter()
            .zip(&m.b_out)
            .map(|(z, b)| z + b)
            .collect();
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        let p_negative = exps[0] / total;
        let p_positive = exps[2] / total;
        let p_neutral = (1.0 - p_negative - p_positive).max(0.0);

        Ok(SentimentScore::three_class(
            AnalyzerKind::Neural,
            p_positive,
            p_negative,
            p_neutral,
        ))
    }
}
