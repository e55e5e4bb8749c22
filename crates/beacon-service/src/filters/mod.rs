//! Ready-made hit filters.

mod event_labeler;

pub use event_labeler::EventLabelerBuilder;
