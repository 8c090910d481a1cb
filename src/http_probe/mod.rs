pub mod batch;
pub mod measure;
pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::batch::run_batch;
    pub use super::measure::{HttpPageMeasurer, PageMeasurer};
    pub use super::probe::SiteProber;
    pub use super::result::{PageMeasurement, Site, StatusRecord};
    pub use crate::error::MeasureError;
}
