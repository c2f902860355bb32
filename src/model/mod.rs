pub mod campaign;
pub mod layer;
