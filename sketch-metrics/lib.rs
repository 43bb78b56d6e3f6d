pub mod composite;
pub mod penalty;
pub mod similarity;

pub use composite::{ComponentScores, Penalties, composite, final_composite, raw_composite};
pub use penalty::{
    InkDensity, SpatialPenalty, SpatialPenaltyConfig, ink_density, ink_density_penalty, ink_ratio,
    spatial_extra_penalty,
};
pub use similarity::local_similarity;
