mod distance_measure;
mod distance_space;
mod dtw;
mod euclidean;
mod independent;
mod lcss;

pub use distance_measure::{Distance, DistanceMeasure};
pub use distance_space::DistanceMeasureSpace;
pub use dtw::Dtw;
pub use euclidean::Euclidean;
pub use independent::Independent;
pub use lcss::Lcss;
