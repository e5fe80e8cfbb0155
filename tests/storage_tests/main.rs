//! EventStorage facade tests
