// vellum-common: shared types and path confinement for the vellum workspace

pub mod path;
pub mod types;
