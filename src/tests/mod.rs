// Test modules for clinic-recovery crate
//
// Each source file has a corresponding test file that focuses on business
// logic verification.

// Shared fixtures
pub mod helpers;

pub mod core_types;
pub mod error;

// Strategy tests, one file per strategy
pub mod auth_strategy;
