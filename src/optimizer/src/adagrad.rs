use std::collections::HashMap;

use located_error::prelude::*;

use crate::error::OptimizerBuilderError;

/// AdaGrad with FOBOS lazy L1 regularization: each feature accumulates its
/// own per-coordinate learning rate from the sum of squared gradients it
/// has seen, and an L1 shrinkage step is applied lazily (only to
/// coordinates a gradient update actually touches) rather than densely
/// over the whole weight vector every step.
pub struct AdaGradOptimizer {
    weights: Vec<f64>,
    sum_squared_gradients: Vec<f64>,
    learning_rate: f64,
    l1_strength: f64,
    epsilon: f64,
    step: u64,
}

impl AdaGradOptimizer {
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Applies one AdaGrad+FOBOS update from a sparse gradient map (as
    /// produced by `inference_engine::InferenceEngine::compute_feature_count_expectations`
    /// minus its Viterbi counterpart, or any other per-example gradient).
    pub fn step(&mut self, gradient: &HashMap<usize, f64>) {
        self.step += 1;
        for (&idx, &g) in gradient {
            if idx >= self.weights.len() {
                continue;
            }
            self.sum_squared_gradients[idx] += g * g;
            let adapted_rate = self.learning_rate / (self.epsilon + self.sum_squared_gradients[idx].sqrt());
            let updated = self.weights[idx] - adapted_rate * g;
            self.weights[idx] = soft_threshold(updated, adapted_rate * self.l1_strength);
        }
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

pub struct AdaGradBuilder {
    learning_rate: f64,
    l1_strength: f64,
    epsilon: f64,
    num_features: Option<usize>,
    initial_weights: Option<Vec<f64>>,
}

impl Default for AdaGradBuilder {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            l1_strength: 0.0,
            epsilon: 1e-8,
            num_features: None,
            initial_weights: None,
        }
    }
}

impl AdaGradBuilder {
    pub fn learning_rate(&mut self, rate: f64) -> &mut Self {
        self.learning_rate = rate;
        self
    }

    pub fn l1_strength(&mut self, strength: f64) -> &mut Self {
        self.l1_strength = strength;
        self
    }

    pub fn num_features(&mut self, n: usize) -> &mut Self {
        self.num_features = Some(n);
        self
    }

    pub fn initial_weights(&mut self, weights: Vec<f64>) -> &mut Self {
        self.num_features = Some(weights.len());
        self.initial_weights = Some(weights);
        self
    }

    pub fn build(&self) -> Result<AdaGradOptimizer> {
        let loc_msg = "While building an AdaGrad optimizer";
        if self.learning_rate <= 0.0 {
            return Err(OptimizerBuilderError::NonPositiveLearningRate(self.learning_rate)).with_loc(|| loc_msg);
        }
        if self.l1_strength < 0.0 {
            return Err(OptimizerBuilderError::NegativeL1Strength(self.l1_strength)).with_loc(|| loc_msg);
        }
        let num_features = self.num_features.ok_or(OptimizerBuilderError::MissingNumFeatures).with_loc(|| loc_msg)?;

        let weights = self.initial_weights.clone().unwrap_or_else(|| vec![0.0; num_features]);
        Ok(AdaGradOptimizer {
            weights,
            sum_squared_gradients: vec![0.0; num_features],
            learning_rate: self.learning_rate,
            l1_strength: self.l1_strength,
            epsilon: self.epsilon,
            step: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_weight_against_the_gradient() {
        let mut opt = AdaGradBuilder::default().num_features(3).learning_rate(1.0).build().unwrap();
        let mut gradient = HashMap::new();
        gradient.insert(1, 1.0);
        opt.step(&gradient);
        assert!(opt.weights()[1] < 0.0);
        assert_eq!(opt.weights()[0], 0.0);
    }

    #[test]
    fn l1_strength_shrinks_small_updates_to_zero() {
        let mut opt = AdaGradBuilder::default().num_features(3).learning_rate(0.01).l1_strength(1000.0).build().unwrap();
        let mut gradient = HashMap::new();
        gradient.insert(0, 0.5);
        opt.step(&gradient);
        assert_eq!(opt.weights()[0], 0.0);
    }

    #[test]
    fn negative_l1_strength_is_rejected() {
        let result = AdaGradBuilder::default().num_features(3).l1_strength(-1.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_num_features_is_rejected() {
        let result = AdaGradBuilder::default().build();
        assert!(result.is_err());
    }
}
