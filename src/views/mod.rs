//! The git-facing views: commit cards and the columns that hold them.

pub mod column;
pub mod commit;

pub use column::{BranchColumn, CommitColumn, RevColumn};
pub use commit::{CommitPanel, Selection};
