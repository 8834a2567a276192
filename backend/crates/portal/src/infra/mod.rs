//! Infrastructure Layer

pub mod simulated;

pub use simulated::SimulatedClassifier;
