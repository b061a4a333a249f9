//! Integration tests for the allocation solver
//!
//! Tests are organized by topic:
//! - `solver` - End-to-end solves, optimality conditions, error paths
//! - `history` - Convergence tracking across full solves
