//! Title sentiment analyzers and the score backfill job.
//!
//! Three interchangeable analyzers implement [`SentimentAnalyzer`]: a
//! valence lexicon, a multinomial naive Bayes classifier, and a small LSTM
//! whose weights are loaded from a JSON artifact. [`run_backfill`] walks the
//! store for records missing a score and fills them in.

pub mod analyzer;
pub mod backfill;
pub mod error;
pub mod lexicon;
pub mod naive_bayes;
pub mod neural;
pub mod types;

mod corpus;
mod tokenize;

pub use analyzer::{load_analyzer, load_analyzers, Analyzer, SentimentAnalyzer};
pub use backfill::{run_backfill, BackfillReport};
pub use error::SentimentError;
pub use lexicon::LexiconAnalyzer;
pub use naive_bayes::{NaiveBayesAnalyzer, NaiveBayesModel};
pub use neural::{NeuralAnalyzer, NeuralModel};
pub use types::SentimentConfig;
