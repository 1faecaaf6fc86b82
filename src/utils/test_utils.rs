//! Test utilities for solver and engine tests.
