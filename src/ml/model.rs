use burn::{
    module::Param,
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::{
        activation::{log_softmax, relu, softmax},
        Distribution,
    },
};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// How weight matrices start out. Biases always start at `bias_init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightInit {
    /// Variance-scaled uniform (Glorot).
    Xavier,
    /// All zeros. Every hidden unit then computes the same value, so the
    /// hidden stack contributes no more than a single linear unit would.
    Zeros,
}

impl WeightInit {
    fn initializer(self) -> Initializer {
        match self {
            WeightInit::Xavier => Initializer::XavierUniform { gain: 1.0 },
            WeightInit::Zeros  => Initializer::Zeros,
        }
    }
}

impl std::str::FromStr for WeightInit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xavier" => Ok(WeightInit::Xavier),
            "zeros"  => Ok(WeightInit::Zeros),
            other    => Err(format!("unknown initializer '{other}' (expected xavier or zeros)")),
        }
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct HandNetConfig {
    pub feature_count: usize,
    pub class_count:   usize,
    /// Hidden width is `round((feature_count + class_count) * hidden_ratio)`.
    pub hidden_ratio:  f64,
    #[config(default = 1)]
    pub hidden_layers: usize,
    #[config(default = "WeightInit::Xavier")]
    pub init:          WeightInit,
    #[config(default = 0.1)]
    pub bias_init:     f64,
}

impl HandNetConfig {
    /// Halves round to even, so 2.5 → 2 and 3.5 → 4.
    pub fn hidden_width(&self) -> usize {
        let raw = (self.feature_count + self.class_count) as f64 * self.hidden_ratio;
        raw.round_ties_even().max(0.0) as usize
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.feature_count == 0 || self.class_count == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "network needs at least one feature and one class (got {} and {})",
                self.feature_count, self.class_count
            )));
        }
        if self.hidden_layers == 0 {
            return Err(PipelineError::InvalidConfig("hidden_layers must be at least 1".into()));
        }
        if self.hidden_width() == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "hidden_ratio {} gives a hidden layer of width 0",
                self.hidden_ratio
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> crate::error::Result<HandNet<B>> {
        self.validate()?;
        let width = self.hidden_width();

        let mut hidden  = Vec::with_capacity(self.hidden_layers);
        let mut d_input = self.feature_count;
        for _ in 0..self.hidden_layers {
            hidden.push(self.dense(d_input, width, device));
            d_input = width;
        }
        let output = self.dense(d_input, self.class_count, device);

        Ok(HandNet { hidden, output })
    }

    fn dense<B: Backend>(&self, d_input: usize, d_output: usize, device: &B::Device) -> Linear<B> {
        let mut linear = LinearConfig::new(d_input, d_output)
            .with_initializer(self.init.initializer())
            .init(device);
        linear.bias = Some(Param::from_tensor(Tensor::full([d_output], self.bias_init, device)));
        linear
    }
}

/// Feed-forward hand-class estimator:
/// input → (Linear → ReLU)×n → dropout → Linear → logits.
#[derive(Module, Debug)]
pub struct HandNet<B: Backend> {
    pub hidden: Vec<Linear<B>>,
    pub output: Linear<B>,
}

impl<B: Backend> HandNet<B> {
    /// features: [batch, F] → logits: [batch, C]
    ///
    /// `keep_prob` is the dropout keep probability; 1.0 disables dropout.
    pub fn forward(&self, features: Tensor<B, 2>, keep_prob: f64) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(features, |x, layer| relu(layer.forward(x)));
        self.output.forward(dropout(x, keep_prob))
    }

    /// Class probabilities with dropout disabled.
    pub fn predict(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(features, 1.0), 1)
    }

    /// Mean softmax cross-entropy against label distributions, plus the logits.
    pub fn forward_loss(
        &self,
        features:  Tensor<B, 2>,
        labels:    Tensor<B, 2>,
        keep_prob: f64,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(features, keep_prob);
        (soft_cross_entropy(logits.clone(), labels), logits)
    }

    pub fn feature_count(&self) -> usize {
        self.hidden
            .first()
            .map(|layer| layer.weight.val().dims()[0])
            .unwrap_or_else(|| self.output.weight.val().dims()[0])
    }

    pub fn class_count(&self) -> usize {
        self.output.weight.val().dims()[1]
    }
}

// NOTE: hand-rolled instead of burn::nn::Dropout because the keep probability is chosen per call.
/// Zero a random `1 - keep_prob` share of activations and rescale the rest.
fn dropout<B: Backend>(x: Tensor<B, 2>, keep_prob: f64) -> Tensor<B, 2> {
    if keep_prob >= 1.0 {
        return x;
    }
    let mask = x.random_like(Distribution::Bernoulli(keep_prob));
    x * mask / keep_prob
}

/// Cross-entropy between `softmax(logits)` and soft (or one-hot) labels.
pub fn soft_cross_entropy<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    (labels * log_softmax(logits, 1)).sum_dim(1).mean().neg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::TensorData};

    type B = NdArray;

    fn input(rows: usize, width: usize) -> Tensor<B, 2> {
        let values: Vec<f32> = (0..rows * width).map(|v| (v as f32 * 0.37).sin()).collect();
        Tensor::from_data(TensorData::new(values, [rows, width]), &Default::default())
    }

    fn rows(t: Tensor<B, 2>) -> Vec<Vec<f32>> {
        let [_, width] = t.dims();
        let flat = t.into_data().to_vec::<f32>().unwrap();
        flat.chunks(width).map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_hidden_width_rounding() {
        assert_eq!(HandNetConfig::new(15, 169, 0.66).hidden_width(), 121);
        assert_eq!(HandNetConfig::new(15, 169, 0.5).hidden_width(), 92);
        assert_eq!(HandNetConfig::new(2, 3, 0.5).hidden_width(), 2);
        assert_eq!(HandNetConfig::new(3, 4, 0.5).hidden_width(), 4);
    }

    #[test]
    fn test_layer_shapes() {
        let net = HandNetConfig::new(15, 169, 0.5)
            .with_hidden_layers(2)
            .init::<B>(&Default::default())
            .unwrap();
        assert_eq!(net.hidden.len(), 2);
        assert_eq!(net.hidden[0].weight.val().dims(), [15, 92]);
        assert_eq!(net.hidden[1].weight.val().dims(), [92, 92]);
        assert_eq!(net.output.weight.val().dims(), [92, 169]);
        assert_eq!(net.feature_count(), 15);
        assert_eq!(net.class_count(), 169);
    }

    #[test]
    fn test_zero_width_rejected() {
        let err = HandNetConfig::new(1, 1, 0.1).init::<B>(&Default::default());
        assert!(matches!(err, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_init_predicts_uniform() {
        let net = HandNetConfig::new(4, 5, 0.5)
            .with_init(WeightInit::Zeros)
            .with_bias_init(0.0)
            .init::<B>(&Default::default())
            .unwrap();
        for row in rows(net.predict(input(3, 4))) {
            for p in row {
                assert!((p - 0.2).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_predict_rows_sum_to_one() {
        let net = HandNetConfig::new(6, 9, 0.66).init::<B>(&Default::default()).unwrap();
        for row in rows(net.predict(input(8, 6))) {
            let total: f32 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-5, "row sums to {total}");
            assert!(row.iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn test_full_keep_prob_is_deterministic() {
        let net = HandNetConfig::new(3, 3, 1.0).init::<B>(&Default::default()).unwrap();
        let a = rows(net.forward(input(2, 3), 1.0));
        let b = rows(net.forward(input(2, 3), 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_dropout_zeroes_or_rescales_hidden_activations() {
        let net = HandNetConfig::new(10, 4, 1.0).init::<B>(&Default::default()).unwrap();
        let hidden = relu(net.hidden[0].forward(input(16, 10)));

        let clean   = hidden.clone().into_data().to_vec::<f32>().unwrap();
        let dropped = dropout(hidden, 0.5).into_data().to_vec::<f32>().unwrap();

        let mut zeroed = 0;
        let mut kept   = 0;
        for (&x, &y) in clean.iter().zip(&dropped) {
            if x == 0.0 {
                assert_eq!(y, 0.0);
            } else if y == 0.0 {
                zeroed += 1;
            } else {
                assert_eq!(y, x * 2.0);
                kept += 1;
            }
        }
        assert!(zeroed > 0, "no activation was dropped");
        assert!(kept > 0, "every activation was dropped");
    }

    #[test]
    fn test_dropout_full_keep_is_identity() {
        let x = input(4, 7);
        assert_eq!(rows(dropout(x.clone(), 1.0)), rows(x));
    }

    #[test]
    fn test_cross_entropy_of_uniform_logits() {
        let device = Default::default();
        let logits = Tensor::<B, 2>::zeros([2, 4], &device);
        let labels = Tensor::<B, 2>::from_data(
            TensorData::new(vec![1.0f32, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0], [2, 4]),
            &device,
        );
        let loss = soft_cross_entropy(logits, labels).into_scalar().elem::<f32>();
        assert!((loss - 4f32.ln()).abs() < 1e-5);
    }
}
