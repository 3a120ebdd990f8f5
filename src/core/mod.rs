pub mod dimensions;
pub mod instances;
