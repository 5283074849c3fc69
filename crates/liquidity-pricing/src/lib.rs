//! Segment selection and spread computation.

pub mod registry;
pub mod resolver;

pub use registry::SegmentRegistry;
pub use resolver::SpreadResolver;
