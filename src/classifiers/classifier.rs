use crate::core::instances::{TimeSeriesInstance, TimeSeriesInstances};
use crate::error::TreeError;

pub trait Classifier {
    fn build_classifier(&mut self, data: &TimeSeriesInstances) -> Result<(), TreeError>;

    /// Class probabilities for `instance`, one entry per class.
    fn distribution_for_instance(
        &mut self,
        instance: &TimeSeriesInstance,
    ) -> Result<Vec<f64>, TreeError>;

    /// Index of the most probable class; the lowest index wins ties.
    fn classify_instance(&mut self, instance: &TimeSeriesInstance) -> Result<usize, TreeError> {
        let distribution = self.distribution_for_instance(instance)?;
        let mut best = 0;
        for (class, &p) in distribution.iter().enumerate() {
            if p > distribution[best] {
                best = class;
            }
        }
        Ok(best)
    }
}
