// 🧠 Category classifier - pretrained scoring oracle
// A subword tokenizer plus an embedding-bag/linear scorer, loaded from a
// portable JSON artifact pair. The pipeline consults it only for cases the
// rule-based catalogs cannot settle; it is inference-only and must stay a
// pure function of its input so worker threads can share one instance.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::record::Category;

/// Narrow interface every category oracle implements.
///
/// Production uses [`LinearCategoryModel`]; tests use
/// [`FixedCategoryModel`]. Implementations must be safe to call from many
/// worker threads at once.
pub trait CategoryModel: Send + Sync {
    /// Map a normalized name to one of the 21 fixed categories.
    fn predict(&self, name_norm: &str) -> Category;
}

// ============================================================================
// MODEL HYPERPARAMETERS
// ============================================================================

/// Fixed hyperparameters the artifact files are validated against.
#[derive(Debug, Clone, Copy)]
pub struct ModelParams {
    pub vocab_size: usize,
    pub embed_dim: usize,
    pub num_classes: usize,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            vocab_size: 10_000,
            embed_dim: 64,
            num_classes: Category::ALL.len(),
        }
    }
}

// ============================================================================
// LINEAR MODEL
// ============================================================================

#[derive(Debug, Deserialize)]
struct ModelWeights {
    /// vocab_size rows of embed_dim.
    embedding: Vec<Vec<f32>>,
    /// num_classes rows of embed_dim.
    fc_weight: Vec<Vec<f32>>,
    /// num_classes entries.
    fc_bias: Vec<f32>,
}

/// Subword tokenizer + mean-pooled embedding bag + linear layer.
///
/// Artifact format:
/// - vocabulary: JSON array of subword strings, index = token id, id 0
///   reserved for padding and never pooled;
/// - weights: JSON object with `embedding`, `fc_weight`, `fc_bias`.
///
/// Inference lowercases the input, segments it by greedy longest-match
/// against the vocabulary (unknown characters are skipped), mean-pools the
/// matched token embeddings and takes the argmax of the linear layer over
/// [`Category::ALL`]. An input with no known subwords scores the bias alone.
#[derive(Debug)]
pub struct LinearCategoryModel {
    vocab_index: HashMap<String, usize>,
    max_token_chars: usize,
    embedding: Vec<Vec<f32>>,
    fc_weight: Vec<Vec<f32>>,
    fc_bias: Vec<f32>,
}

impl LinearCategoryModel {
    /// Load and validate the artifact pair. Any missing file or dimension
    /// mismatch is a configuration error at construction time.
    pub fn load(vocab_path: &Path, weights_path: &Path, params: ModelParams) -> Result<Self> {
        let vocab_raw = fs::read_to_string(vocab_path)
            .with_context(|| format!("Failed to read classifier vocabulary: {}", vocab_path.display()))?;
        let vocab: Vec<String> = serde_json::from_str(&vocab_raw)
            .with_context(|| format!("Failed to parse classifier vocabulary: {}", vocab_path.display()))?;

        let weights_raw = fs::read_to_string(weights_path)
            .with_context(|| format!("Failed to read classifier weights: {}", weights_path.display()))?;
        let weights: ModelWeights = serde_json::from_str(&weights_raw)
            .with_context(|| format!("Failed to parse classifier weights: {}", weights_path.display()))?;

        Self::from_parts(vocab, weights, params)
            .with_context(|| format!("Invalid classifier artifact: {}", weights_path.display()))
    }

    fn from_parts(vocab: Vec<String>, weights: ModelWeights, params: ModelParams) -> Result<Self> {
        if params.num_classes != Category::ALL.len() {
            return Err(anyhow!(
                "Model is configured for {} classes, taxonomy has {}",
                params.num_classes,
                Category::ALL.len()
            ));
        }
        if vocab.len() != params.vocab_size {
            return Err(anyhow!(
                "Vocabulary has {} entries, expected {}",
                vocab.len(),
                params.vocab_size
            ));
        }
        if weights.embedding.len() != params.vocab_size {
            return Err(anyhow!(
                "Embedding matrix has {} rows, expected {}",
                weights.embedding.len(),
                params.vocab_size
            ));
        }
        if weights.embedding.iter().any(|row| row.len() != params.embed_dim) {
            return Err(anyhow!("Embedding rows must all have width {}", params.embed_dim));
        }
        if weights.fc_weight.len() != params.num_classes
            || weights.fc_weight.iter().any(|row| row.len() != params.embed_dim)
        {
            return Err(anyhow!(
                "Linear layer must be {} x {}",
                params.num_classes,
                params.embed_dim
            ));
        }
        if weights.fc_bias.len() != params.num_classes {
            return Err(anyhow!("Bias must have {} entries", params.num_classes));
        }

        let max_token_chars = vocab.iter().map(|t| t.chars().count()).max().unwrap_or(0);
        let vocab_index = vocab
            .into_iter()
            .enumerate()
            .skip(1) // id 0 is padding
            .map(|(id, token)| (token, id))
            .collect();

        Ok(LinearCategoryModel {
            vocab_index,
            max_token_chars,
            embedding: weights.embedding,
            fc_weight: weights.fc_weight,
            fc_bias: weights.fc_bias,
        })
    }

    /// Greedy longest-match subword segmentation.
    fn encode(&self, text: &str) -> Vec<usize> {
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        let mut ids = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            let mut matched = None;
            let longest = self.max_token_chars.min(chars.len() - pos);
            for len in (1..=longest).rev() {
                let piece: String = chars[pos..pos + len].iter().collect();
                if let Some(&id) = self.vocab_index.get(&piece) {
                    matched = Some((id, len));
                    break;
                }
            }
            match matched {
                Some((id, len)) => {
                    ids.push(id);
                    pos += len;
                }
                None => pos += 1,
            }
        }
        ids
    }

    fn logits(&self, ids: &[usize]) -> Vec<f32> {
        let embed_dim = self.fc_weight.first().map(|r| r.len()).unwrap_or(0);
        let mut pooled = vec![0.0f32; embed_dim];

        if !ids.is_empty() {
            for &id in ids {
                for (acc, &v) in pooled.iter_mut().zip(&self.embedding[id]) {
                    *acc += v;
                }
            }
            let n = ids.len() as f32;
            for acc in pooled.iter_mut() {
                *acc /= n;
            }
        }

        self.fc_weight
            .iter()
            .zip(&self.fc_bias)
            .map(|(row, bias)| row.iter().zip(&pooled).map(|(w, x)| w * x).sum::<f32>() + bias)
            .collect()
    }
}

impl CategoryModel for LinearCategoryModel {
    fn predict(&self, name_norm: &str) -> Category {
        let ids = self.encode(name_norm);
        let logits = self.logits(&ids);

        let mut best = 0;
        for (idx, &score) in logits.iter().enumerate() {
            if score > logits[best] {
                best = idx;
            }
        }
        Category::ALL[best]
    }
}

// ============================================================================
// DETERMINISTIC STUB
// ============================================================================

/// Deterministic fixed-mapping oracle: the first rule whose key occurs in
/// the input wins, otherwise the default. Intended for tests and dry runs
/// without a trained artifact.
pub struct FixedCategoryModel {
    rules: Vec<(String, Category)>,
    default: Category,
}

impl FixedCategoryModel {
    pub fn new(rules: Vec<(String, Category)>, default: Category) -> Self {
        FixedCategoryModel { rules, default }
    }

    /// Everything maps to the catch-all category.
    pub fn catch_all() -> Self {
        FixedCategoryModel::new(Vec::new(), Category::Other)
    }
}

impl CategoryModel for FixedCategoryModel {
    fn predict(&self, name_norm: &str) -> Category {
        self.rules
            .iter()
            .find(|(key, _)| name_norm.contains(key.as_str()))
            .map(|(_, cat)| *cat)
            .unwrap_or(self.default)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_params() -> ModelParams {
        ModelParams {
            vocab_size: 4,
            embed_dim: 2,
            num_classes: Category::ALL.len(),
        }
    }

    /// vocab: pad, "мол", "вод", "а"; the embedding pushes "мол" towards
    /// class 9 (Dairy) and "вод" towards class 2 (Beverages).
    fn tiny_model() -> LinearCategoryModel {
        let vocab = vec![
            "<pad>".to_string(),
            "мол".to_string(),
            "вод".to_string(),
            "а".to_string(),
        ];
        let embedding = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ];
        let mut fc_weight = vec![vec![0.0, 0.0]; Category::ALL.len()];
        fc_weight[9] = vec![1.0, 0.0]; // Dairy
        fc_weight[2] = vec![0.0, 1.0]; // Beverages
        let fc_bias = vec![0.0; Category::ALL.len()];

        LinearCategoryModel::from_parts(
            vocab,
            ModelWeights {
                embedding,
                fc_weight,
                fc_bias,
            },
            tiny_params(),
        )
        .unwrap()
    }

    #[test]
    fn test_greedy_longest_match_encoding() {
        let model = tiny_model();
        // "мола" → "мол" + "а"; unknown chars are skipped.
        assert_eq!(model.encode("мола"), vec![1, 3]);
        assert_eq!(model.encode("xyz"), Vec::<usize>::new());
    }

    #[test]
    fn test_predict_is_in_taxonomy_and_deterministic() {
        let model = tiny_model();
        let cat = model.predict("молоко");
        assert_eq!(cat, Category::Dairy);
        assert_eq!(model.predict("молоко"), cat);

        assert_eq!(model.predict("вода"), Category::Beverages);
        // No known subwords: bias-only argmax, ties resolve to index 0.
        assert_eq!(model.predict("xyz"), Category::Alcohol);
    }

    #[test]
    fn test_dimension_validation() {
        let vocab = vec!["<pad>".to_string(), "a".to_string()];
        let bad = ModelWeights {
            embedding: vec![vec![0.0, 0.0]], // 1 row, vocab says 2
            fc_weight: vec![vec![0.0, 0.0]; Category::ALL.len()],
            fc_bias: vec![0.0; Category::ALL.len()],
        };
        let params = ModelParams {
            vocab_size: 2,
            embed_dim: 2,
            num_classes: Category::ALL.len(),
        };
        let err = LinearCategoryModel::from_parts(vocab, bad, params).unwrap_err();
        assert!(err.to_string().contains("Embedding matrix"));
    }

    #[test]
    fn test_fixed_model_rules() {
        let stub = FixedCategoryModel::new(
            vec![("вода".to_string(), Category::Beverages)],
            Category::Other,
        );
        assert_eq!(stub.predict("вода питьевая"), Category::Beverages);
        assert_eq!(stub.predict("сыр"), Category::Other);
    }
}
