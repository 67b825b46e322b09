//! Model components: scaler, regression tree and artifact persistence

pub mod scaler;
pub mod store;
pub mod tree;

pub use scaler::MinMaxScaler;
pub use store::{ArtifactStore, LoadedArtifacts, ModelBundle, ModelMetadata};
pub use tree::{DecisionTreeRegressor, TreeParams};
