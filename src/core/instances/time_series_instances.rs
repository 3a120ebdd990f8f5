use crate::core::instances::TimeSeriesInstance;
use crate::error::TreeError;
use serde::{Deserialize, Serialize};

/// A labelled collection of time series, e.g. a training set.
///
/// Training instances must all carry a label below `class_labels.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesInstances {
    instances: Vec<TimeSeriesInstance>,
    class_labels: Vec<String>,
}

impl TimeSeriesInstances {
    pub fn new(
        instances: Vec<TimeSeriesInstance>,
        class_labels: Vec<String>,
    ) -> Result<Self, TreeError> {
        let num_classes = class_labels.len();
        for (i, inst) in instances.iter().enumerate() {
            match inst.label() {
                Some(label) if label < num_classes => {}
                Some(label) => {
                    return Err(TreeError::InvalidData(format!(
                        "instance {i} has label {label} but only {num_classes} classes are declared"
                    )));
                }
                None => {
                    return Err(TreeError::InvalidData(format!(
                        "instance {i} has no class label"
                    )));
                }
            }
        }
        Ok(Self {
            instances,
            class_labels,
        })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimeSeriesInstance> {
        self.instances.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeriesInstance> {
        self.instances.iter()
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    /// Label of the instance at `index`; training data is validated so every
    /// instance has one.
    pub fn label_of(&self, index: usize) -> Option<usize> {
        self.instances.get(index).and_then(TimeSeriesInstance::label)
    }

    pub fn max_num_dimensions(&self) -> usize {
        self.instances
            .iter()
            .map(TimeSeriesInstance::num_dimensions)
            .max()
            .unwrap_or(0)
    }

    pub fn is_multivariate(&self) -> bool {
        self.max_num_dimensions() > 1
    }
}
