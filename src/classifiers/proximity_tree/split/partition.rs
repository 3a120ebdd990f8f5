use crate::core::instances::TimeSeriesInstance;
use serde::{Deserialize, Serialize};

/// A training instance anchoring a partition, kept in its transformed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    pub index: usize,
    pub label: usize,
    pub transformed: TimeSeriesInstance,
}

/// The data routed to one set of exemplars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    data_indices: Vec<usize>,
    labels: Vec<usize>,
    class_distribution: Vec<f64>,
    exemplars: Vec<Exemplar>,
}

impl Partition {
    pub fn new(exemplars: Vec<Exemplar>, num_classes: usize) -> Self {
        Self {
            data_indices: Vec::new(),
            labels: Vec::new(),
            class_distribution: vec![0.0; num_classes],
            exemplars,
        }
    }

    pub(crate) fn add(&mut self, index: usize, label: usize) {
        self.data_indices.push(index);
        self.labels.push(label);
        if let Some(count) = self.class_distribution.get_mut(label) {
            *count += 1.0;
        }
    }

    pub fn data_indices(&self) -> &[usize] {
        &self.data_indices
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn class_distribution(&self) -> &[f64] {
        &self.class_distribution
    }

    pub fn exemplars(&self) -> &[Exemplar] {
        &self.exemplars
    }

    pub fn len(&self) -> usize {
        self.data_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_indices.is_empty()
    }

    /// Normalized class vote of the exemplars.
    pub fn distribution_for_instance(&self) -> Vec<f64> {
        let mut votes = vec![0.0; self.class_distribution.len()];
        for exemplar in &self.exemplars {
            if let Some(vote) = votes.get_mut(exemplar.label) {
                *vote += 1.0;
            }
        }
        let total: f64 = votes.iter().sum();
        if total > 0.0 {
            votes.iter_mut().for_each(|v| *v /= total);
        }
        votes
    }
}
