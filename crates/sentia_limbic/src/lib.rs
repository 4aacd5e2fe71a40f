//! # Sentia Limbic Layer
//!
//! Fast, non-verbal state regulation: the neurochemical affect model.
//!
//! - [`AffectModel`] moves the five chemical levels once per turn
//!   (external emotion, internal feedback, homeostatic decay, clamp)
//! - [`uncertainty_feedback`] turns a low-confidence reflection into stress
//!   for the next turn
//! - [`BehaviorModulation`] and [`describe_mood`] translate levels into the
//!   behavioural bias the reasoning layer sees

mod model;
mod somatic;

pub use model::{uncertainty_feedback, AffectModel};
pub use somatic::{describe_mood, status_report, BehaviorModulation};
