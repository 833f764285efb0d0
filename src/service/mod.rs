//! Business logic services

pub mod gate;

pub use gate::{GateDecision, OnboardingGate};
