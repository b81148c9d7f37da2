pub mod dataset;
pub mod forest;
pub mod metrics;
pub mod plot;
pub mod search;
pub mod trainer;
pub mod tree;

pub use dataset::{Dataset, Split};
pub use forest::{ForestConfig, RandomForest};
pub use trainer::{train_and_evaluate, TrainOutcome, TrainReport, TrainerConfig};
