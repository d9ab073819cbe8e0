//! Domain types for claims, search budgets, evidence and verdicts.

pub mod claim;
pub mod evidence;
pub mod locale;
pub mod mode;
pub mod verdict;
