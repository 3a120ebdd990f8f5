mod time_series_instance;
mod time_series_instances;

pub use time_series_instance::TimeSeriesInstance;
pub use time_series_instances::TimeSeriesInstances;
