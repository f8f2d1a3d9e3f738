//! Preprocessing recipe
//!
//! A [`RecipeConfig`] is fitted on training rows into a [`FittedRecipe`]
//! holding every learned parameter:
//! - center/scale with the training mean and sample standard deviation
//! - Yeo-Johnson power transform with a maximum-likelihood lambda
//! - rare-level collapsing of categorical predictors
//! - one-hot encoding with a fixed `<name>_other` column
//!
//! The fitted recipe is the only thing applied to held-out rows.

mod config;
mod encoder;
mod recipe;
mod scaler;
pub mod transforms;

pub use config::RecipeConfig;
pub use encoder::OneHotEncoder;
pub use recipe::{ColumnStep, FeatureMatrix, FittedRecipe};
pub use scaler::ScalerParams;
pub use transforms::YeoJohnson;
