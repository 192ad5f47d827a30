//! Link functions applied to raw margins and the decision rule that turns
//! the resulting scores into class labels.

/// Inference-time output transformation, derived from the training objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTransform {
    /// Scores are raw margins (`binary:logitraw`, `binary:hinge`).
    #[default]
    Identity,
    /// Logistic sigmoid (`binary:logistic`, `reg:logistic`).
    Sigmoid,
    /// Per-row softmax over class margins (`multi:softprob`, `multi:softmax`).
    Softmax,
}

impl OutputTransform {
    /// Transform one row of margins in place.
    ///
    /// NaN and Inf propagate.
    #[inline]
    pub fn transform_inplace(&self, row: &mut [f32]) {
        match self {
            OutputTransform::Identity => {}
            OutputTransform::Sigmoid => row.iter_mut().for_each(|x| *x = sigmoid(*x)),
            OutputTransform::Softmax => softmax_inplace(row),
        }
    }

    /// Decision boundary for single-output scores: positive iff `score > threshold`.
    #[inline]
    pub fn binary_threshold(&self) -> f32 {
        match self {
            OutputTransform::Sigmoid => 0.5,
            OutputTransform::Identity | OutputTransform::Softmax => 0.0,
        }
    }

    /// Class label for one row of transformed scores.
    ///
    /// Single-output rows are thresholded; multi-output rows take the argmax,
    /// with the lowest index winning ties.
    pub fn label(&self, scores: &[f32]) -> u32 {
        match scores {
            [score] => u32::from(*score > self.binary_threshold()),
            _ => argmax(scores),
        }
    }
}

/// Numerically stable sigmoid; input is clamped to [-500, 500].
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}

#[inline]
fn softmax_inplace(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }

    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    if sum > 0.0 {
        row.iter_mut().for_each(|x| *x /= sum);
    }
}

fn argmax(scores: &[f32]) -> u32 {
    let mut best = 0;
    for (idx, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = idx;
        }
    }
    best as u32
}
