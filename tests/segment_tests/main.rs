//! Segment layer tests: registry, write segment manager, read segment set

mod registry_tests;
mod writer_tests;
