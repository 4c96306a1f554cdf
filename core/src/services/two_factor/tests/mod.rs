//! Tests for the two-factor service
