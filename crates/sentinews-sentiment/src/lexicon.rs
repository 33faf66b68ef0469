//! Valence-lexicon analyzer with negation and intensifier handling.
//!
//! Each known word carries a valence on a `[-4, 4]` scale. Intensifiers in
//! the three preceding tokens scale a word's valence, a preceding negator
//! flips and dampens it, and a `but` shifts weight toward the clause after
//! it. The three-class split is the share of positive, negative, and
//! neutral mass; `compound` normalizes the valence sum into `[-1, 1]`.

use sentinews_core::{AnalyzerKind, SentimentScore};

use crate::error::SentimentError;
use crate::tokenize::{require_text, tokenize};

/// Normalization constant for `compound = s / sqrt(s^2 + ALPHA)`.
const ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const LOOKBACK: usize = 3;

pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive
    ("accomplish", 1.8),
    ("admire", 2.1),
    ("agree", 1.5),
    ("applaud", 2.0),
    ("best", 3.2),
    ("better", 1.9),
    ("boost", 1.7),
    ("boosts", 1.7),
    ("brilliant", 2.8),
    ("celebrate", 2.7),
    ("celebrates", 2.7),
    ("champion", 2.4),
    ("confident", 2.2),
    ("cheer", 2.3),
    ("cheers", 2.3),
    ("endorse", 1.6),
    ("endorsed", 1.6),
    ("endorsement", 1.5),
    ("endorses", 1.6),
    ("excellent", 2.7),
    ("favorite", 2.0),
    ("gain", 1.6),
    ("gains", 1.6),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("honest", 2.3),
    ("hope", 1.9),
    ("hopeful", 2.0),
    ("improve", 1.9),
    ("improves", 1.9),
    ("inspire", 2.2),
    ("inspiring", 2.5),
    ("lead", 1.0),
    ("leads", 1.0),
    ("like", 1.5),
    ("love", 3.2),
    ("loves", 2.7),
    ("optimistic", 2.2),
    ("popular", 1.8),
    ("praise", 2.6),
    ("praised", 2.2),
    ("praises", 2.4),
    ("progress", 1.8),
    ("protect", 1.6),
    ("rally", 0.9),
    ("rallies", 0.9),
    ("safe", 1.9),
    ("strong", 2.3),
    ("stronger", 2.0),
    ("success", 2.7),
    ("successful", 2.8),
    ("support", 1.7),
    ("supports", 1.7),
    ("surge", 1.2),
    ("surges", 1.2),
    ("thank", 1.5),
    ("triumph", 3.0),
    ("trust", 2.3),
    ("unite", 1.8),
    ("victory", 2.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("won", 2.7),
    ("wonderful", 2.7),
    // Negative
    ("abuse", -3.2),
    ("angry", -2.3),
    ("attack", -2.1),
    ("attacks", -2.1),
    ("bad", -2.5),
    ("bash", -1.9),
    ("bashes", -1.9),
    ("blame", -1.4),
    ("blames", -1.4),
    ("chaos", -2.3),
    ("collapse", -2.1),
    ("corrupt", -3.0),
    ("corruption", -3.0),
    ("crisis", -3.1),
    ("criticism", -1.9),
    ("criticize", -1.9),
    ("criticizes", -1.9),
    ("danger", -2.4),
    ("dangerous", -2.1),
    ("death", -2.9),
    ("defeat", -2.3),
    ("defeated", -2.1),
    ("deny", -0.9),
    ("denies", -0.9),
    ("disaster", -3.1),
    ("dishonest", -2.7),
    ("doubt", -1.5),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fails", -2.3),
    ("failure", -2.3),
    ("fake", -2.1),
    ("fear", -2.2),
    ("fight", -1.6),
    ("fraud", -2.8),
    ("hate", -2.7),
    ("hurt", -2.4),
    ("impeach", -1.6),
    ("impeachment", -1.6),
    ("lie", -1.7),
    ("lies", -1.8),
    ("lose", -1.7),
    ("loses", -1.7),
    ("losing", -1.6),
    ("lost", -1.3),
    ("mess", -1.5),
    ("outrage", -2.3),
    ("problem", -1.7),
    ("problems", -1.7),
    ("racist", -3.1),
    ("sad", -2.1),
    ("scandal", -2.4),
    ("slam", -1.6),
    ("slams", -1.6),
    ("struggle", -1.8),
    ("struggles", -1.8),
    ("terrible", -2.5),
    ("threat", -2.4),
    ("threatens", -2.2),
    ("trouble", -1.9),
    ("warn", -1.2),
    ("warns", -1.2),
    ("weak", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
    "can't", "don't", "doesn't", "didn't", "won't", "wouldn't", "isn't", "aren't", "wasn't",
    "weren't", "hasn't", "haven't", "shouldn't",
];

/// Intensifiers (positive) and dampeners (negative), applied as a fraction
/// of [`BOOSTER_INCREMENT`].
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 1.0),
    ("especially", 1.0),
    ("extremely", 1.0),
    ("highly", 1.0),
    ("hugely", 1.0),
    ("incredibly", 1.0),
    ("most", 1.0),
    ("really", 1.0),
    ("so", 1.0),
    ("totally", 1.0),
    ("very", 1.0),
    ("barely", -1.0),
    ("hardly", -1.0),
    ("slightly", -1.0),
    ("somewhat", -1.0),
    ("marginally", -1.0),
];

fn valence(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, v)| v)
}

fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, v)| v)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidInput`] for empty or whitespace-only text.
    pub fn evaluate(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        let tokens = tokenize(require_text(text)?);
        let mut valences = token_valences(&tokens);
        apply_but_shift(&tokens, &mut valences);
        Ok(summarize(&valences))
    }
}

/// Per-token valence after booster and negation adjustments. Tokens with no
/// lexicon entry score `0.0` and count toward the neutral mass.
fn token_valences(tokens: &[String]) -> Vec<f64> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            // Boosters and negators carry no valence of their own.
            if booster(token).is_some() {
                return 0.0;
            }
            let Some(mut v) = valence(token) else {
                return 0.0;
            };

            let window = &tokens[i.saturating_sub(LOOKBACK)..i];
            for (distance, prior) in window.iter().rev().enumerate() {
                if let Some(direction) = booster(prior) {
                    #[allow(clippy::cast_precision_loss)]
                    let decay = 1.0 - 0.05 * distance as f64;
                    v += v.signum() * direction * BOOSTER_INCREMENT * decay;
                }
            }
            if window.iter().any(|w| is_negator(w)) {
                v *= NEGATION_SCALAR;
            }
            v
        })
        .collect()
}

/// Words before `but` are halved; words after it are weighted by 1.5.
fn apply_but_shift(tokens: &[String], valences: &mut [f64]) {
    let Some(pivot) = tokens.iter().position(|t| t == "but") else {
        return;
    };
    for (i, v) in valences.iter_mut().enumerate() {
        if i < pivot {
            *v *= 0.5;
        } else if i > pivot {
            *v *= 1.5;
        }
    }
}

fn summarize(valences: &[f64]) -> SentimentScore {
    let sum: f64 = valences.iter().sum();
    let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);

    let mut pos_mass = 0.0;
    let mut neg_mass = 0.0;
    let mut neu_mass = 0.0;
    for &v in valences {
        if v > 0.0 {
            pos_mass += v + 1.0;
        } else if v < 0.0 {
            neg_mass += -(v - 1.0);
        } else {
            neu_mass += 1.0;
        }
    }

    let total = pos_mass + neg_mass + neu_mass;
    if total <= 0.0 {
        return SentimentScore::three_class(AnalyzerKind::Lexicon, 0.0, 0.0, 1.0)
            .with_compound(0.0);
    }

    let p_positive = pos_mass / total;
    let p_negative = neg_mass / total;
    // Derive neutral so the three classes sum to exactly 1.
    let p_neutral = (1.0 - p_positive - p_negative).max(0.0);

    SentimentScore::three_class(AnalyzerKind::Lexicon, p_positive, p_negative, p_neutral)
        .with_compound(compound)
}
