pub mod combiner;
pub mod node;

pub use combiner::Combiner;
pub use node::{MatchMode, OperatorNode, Posting, PostingList, TermLeaf};
