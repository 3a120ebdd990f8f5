use crate::classifiers::proximity_tree::split::Split;
use crate::core::instances::{TimeSeriesInstance, TimeSeriesInstances};

fn class_labels(n: usize) -> Vec<String> {
    (0..n).map(|c| format!("class-{c}")).collect()
}

/// Three well separated classes (levels 0, 10 and 20), four series each,
/// interleaved by class.
pub fn separable_dataset() -> TimeSeriesInstances {
    let instances = (0..12)
        .map(|i| {
            let class = i % 3;
            let values = (0..6)
                .map(|t| class as f64 * 10.0 + ((i * 7 + t * 3) % 5) as f64 * 0.1)
                .collect();
            TimeSeriesInstance::univariate(values, Some(class))
        })
        .collect();
    TimeSeriesInstances::new(instances, class_labels(3)).expect("valid dummy dataset")
}

/// Two series per class; the classes sit far apart.
pub fn four_instance_dataset() -> TimeSeriesInstances {
    let instances = vec![
        TimeSeriesInstance::univariate(vec![0.0, 0.1, 0.0], Some(0)),
        TimeSeriesInstance::univariate(vec![5.0, 5.1, 5.2], Some(1)),
        TimeSeriesInstance::univariate(vec![0.2, 0.0, 0.1], Some(0)),
        TimeSeriesInstance::univariate(vec![5.2, 5.0, 5.1], Some(1)),
    ];
    TimeSeriesInstances::new(instances, class_labels(2)).expect("valid dummy dataset")
}

/// Points `0..n` on a line with alternating labels, which no single split
/// separates, so trees grow deep.
pub fn alternating_line(n: usize) -> TimeSeriesInstances {
    let instances = (0..n)
        .map(|i| TimeSeriesInstance::univariate(vec![i as f64], Some(i % 2)))
        .collect();
    TimeSeriesInstances::new(instances, class_labels(2)).expect("valid dummy dataset")
}

pub fn pure_dataset() -> TimeSeriesInstances {
    let instances = (0..5)
        .map(|i| TimeSeriesInstance::univariate(vec![i as f64, 1.0], Some(1)))
        .collect();
    TimeSeriesInstances::new(instances, class_labels(2)).expect("valid dummy dataset")
}

/// Two classes over three dimensions; only dimension 0 carries the class.
pub fn multivariate_dataset() -> TimeSeriesInstances {
    let instances = (0..8)
        .map(|i| {
            let class = i % 2;
            let signal = vec![class as f64 * 8.0, class as f64 * 8.0 + 0.5, 0.25];
            let noise_a = vec![(i % 3) as f64, 0.0, 1.0];
            let noise_b = vec![1.0, (i % 4) as f64, 0.5];
            TimeSeriesInstance::new(vec![signal, noise_a, noise_b], Some(class))
                .expect("equal length dimensions")
        })
        .collect();
    TimeSeriesInstances::new(instances, class_labels(2)).expect("valid dummy dataset")
}

/// The unbuilt split over all of `data`.
pub fn root_split(data: &TimeSeriesInstances) -> Split {
    let labels = (0..data.len())
        .map(|i| data.label_of(i).unwrap_or(0))
        .collect();
    Split::new((0..data.len()).collect(), labels, data.num_classes())
}
