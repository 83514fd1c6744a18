pub mod expansion;
pub mod frequency;
pub mod operator;
pub mod parallel;
pub mod parser;
pub mod query;
pub mod scorer;
pub mod search_info;

pub use frequency::Frequency;
pub use operator::{Combiner, MatchMode, OperatorNode, Posting, PostingList, TermLeaf};
pub use parser::TeaNode;
pub use query::{Query, TermIndexProvider};
pub use scorer::{Argument, ScoreCalculator, ScoreCalculatorRegistry};
pub use search_info::{IndexType, SearchInformation, TermEntry};
