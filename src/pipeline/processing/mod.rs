// Pipeline stages, in the order they run

pub mod normalize;
pub mod unify;
pub mod clean;
pub mod reconcile;
pub mod enrich;
