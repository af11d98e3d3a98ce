//! Food classifier collaborator interface.
//!
//! The classification model itself is a black box owned by another service;
//! the engine only depends on the input/output shapes defined here. The
//! loaded model is a process-wide resource with an explicit init/shutdown
//! lifecycle and a thread-safe single-initialization guarantee, not a bare
//! module-level global.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::error::{HealthRsError, Result};

/// Normalized image tensor handed to the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    /// Pixel data, row-major, values normalized to [0, 1]
    pub data: Vec<f32>,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Color channels (3 for RGB)
    pub channels: u32,
}

impl ImageTensor {
    /// Check that the buffer length matches the declared dimensions
    pub fn is_consistent(&self) -> bool {
        self.data.len() as u64 == u64::from(self.width) * u64::from(self.height) * u64::from(self.channels)
    }
}

/// Per-100g nutrition vector predicted alongside the label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionVector {
    pub calories: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
    pub fiber_g: f64,
    pub sugars_g: f64,
    pub sodium_mg: f64,
}

/// A lower-confidence alternative prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativePrediction {
    pub label: String,
    pub confidence: f64,
}

/// Classifier output for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodClassification {
    /// Predicted food label
    pub label: String,

    /// Model class index
    pub class_id: u32,

    /// Confidence in percent
    pub confidence: f64,

    /// Predicted nutrition vector
    pub nutrition: NutritionVector,

    /// Top alternative labels with confidences, best first (at most five)
    pub alternatives: Vec<AlternativePrediction>,
}

/// Black-box food classification model
pub trait FoodClassifier: Send + Sync {
    /// Classify one normalized image
    fn classify(&self, image: &ImageTensor) -> Result<FoodClassification>;

    /// Model identifier for logging
    fn model_name(&self) -> &str;
}

static CLASSIFIER: RwLock<Option<Arc<dyn FoodClassifier>>> = RwLock::new(None);

/// Install the process-wide classifier.
///
/// Fails if a classifier is already installed; the model loads once per
/// process and is shared by every request thread.
pub fn init_classifier(classifier: Arc<dyn FoodClassifier>) -> Result<()> {
    let mut slot = CLASSIFIER
        .write()
        .map_err(|_| HealthRsError::Internal("classifier lock poisoned".to_string()))?;
    if slot.is_some() {
        return Err(HealthRsError::Configuration(
            "classifier already initialized".to_string(),
        ));
    }
    tracing::info!(model = classifier.model_name(), "classifier initialized");
    *slot = Some(classifier);
    Ok(())
}

/// Get a handle to the installed classifier
pub fn classifier() -> Result<Arc<dyn FoodClassifier>> {
    let slot = CLASSIFIER
        .read()
        .map_err(|_| HealthRsError::Internal("classifier lock poisoned".to_string()))?;
    slot.clone().ok_or_else(|| {
        HealthRsError::Configuration("classifier not initialized".to_string())
    })
}

/// Tear down the process-wide classifier, releasing the model.
///
/// Safe to call when nothing is installed; outstanding handles stay valid
/// until dropped.
pub fn shutdown_classifier() {
    if let Ok(mut slot) = CLASSIFIER.write() {
        if slot.take().is_some() {
            tracing::info!("classifier shut down");
        }
    }
}
