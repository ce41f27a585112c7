use super::error::BoosterError;

/// Transform applied to the summed margins of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTransform {
    Identity,
    Sigmoid,
    Exp,
    /// `1.0` when the margin is positive, else `0.0`.
    Hinge,
    /// Per-class probabilities.
    Softmax,
    /// Index of the largest margin, as a single value.
    ArgMax,
}

/// How `base_score` (stored in output space) becomes the starting margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaseScoreLink {
    Identity,
    Logit,
    Log,
}

/// Learning objective as far as inference is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    name: String,
    transform: OutputTransform,
    link: BaseScoreLink,
}

impl Objective {
    pub fn parse(name: &str) -> Result<Self, BoosterError> {
        use BaseScoreLink as L;
        use OutputTransform as T;

        let (transform, link) = match name {
            "binary:logistic" | "reg:logistic" => (T::Sigmoid, L::Logit),
            "binary:logitraw" => (T::Identity, L::Logit),
            "binary:hinge" => (T::Hinge, L::Identity),
            "reg:squarederror" | "reg:linear" | "reg:squaredlogerror" | "reg:pseudohubererror"
            | "reg:absoluteerror" | "reg:quantileerror" => (T::Identity, L::Identity),
            "count:poisson" | "reg:gamma" | "reg:tweedie" | "survival:cox" | "survival:aft" => {
                (T::Exp, L::Log)
            }
            "multi:softprob" => (T::Softmax, L::Identity),
            "multi:softmax" => (T::ArgMax, L::Identity),
            "rank:pairwise" | "rank:ndcg" | "rank:map" => (T::Identity, L::Identity),
            other => {
                return Err(BoosterError::UnsupportedObjective {
                    name: other.to_string(),
                });
            }
        };

        Ok(Self {
            name: name.to_string(),
            transform,
            link,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    /// Converts `base_score` into the margin every prediction starts from.
    pub fn base_margin(&self, base_score: f32) -> Result<f32, BoosterError> {
        match self.link {
            BaseScoreLink::Identity => Ok(base_score),
            BaseScoreLink::Logit => {
                if !(base_score > 0.0 && base_score < 1.0) {
                    return Err(BoosterError::InvalidModel {
                        reason: format!(
                            "base_score {base_score} must be in (0, 1) for {}",
                            self.name
                        ),
                    });
                }
                Ok(-(1.0 / base_score - 1.0).ln())
            }
            BaseScoreLink::Log => {
                if base_score <= 0.0 {
                    return Err(BoosterError::InvalidModel {
                        reason: format!("base_score {base_score} must be positive for {}", self.name),
                    });
                }
                Ok(base_score.ln())
            }
        }
    }

    /// Applies the output transform to one row of margins.
    pub fn apply(&self, mut margins: Vec<f32>) -> Vec<f32> {
        match self.transform {
            OutputTransform::Identity => margins,
            OutputTransform::Sigmoid => {
                for m in &mut margins {
                    *m = sigmoid(*m);
                }
                margins
            }
            OutputTransform::Exp => {
                for m in &mut margins {
                    *m = m.exp();
                }
                margins
            }
            OutputTransform::Hinge => {
                for m in &mut margins {
                    *m = if *m > 0.0 { 1.0 } else { 0.0 };
                }
                margins
            }
            OutputTransform::Softmax => softmax(margins),
            OutputTransform::ArgMax => {
                let best = margins
                    .iter()
                    .enumerate()
                    .fold((0usize, f32::NEG_INFINITY), |best, (idx, &m)| {
                        if m > best.1 { (idx, m) } else { best }
                    })
                    .0;
                vec![best as f32]
            }
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(margins: Vec<f32>) -> Vec<f32> {
    let max = margins.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
