//! Predicate classification, spec §4.3 "Predicate/order choice": a
//! `CheckIndexArgument` tracks, per candidate, four disjoint buckets for
//! a predicate plus a single "order scan" slot; `AdoptIndexArgument`
//! holds the chosen file and bitset variable ids once a plan is adopted.

use std::collections::HashMap;

use roaring::RoaringBitmap;

use crate::core::error::Result;
use crate::planner::environment::{Environment, ObjectId};
use crate::planner::order::OrderDirection;

/// Registers a document-id bitset for a bucket classified
/// `ObtainableAsBitset`/`SearchableByBitset`. The planner itself never
/// evaluates the predicate against these bits — that stays with the
/// fulltext operator tree — it only needs a concrete, mergeable set
/// type to carry through `AdoptIndexArgument`'s bitset slots.
pub fn register_bitset(env: &mut Environment, bitmap: RoaringBitmap) -> ObjectId {
    env.register(bitmap)
}

pub fn bitset_of(env: &Environment, id: ObjectId) -> Option<&RoaringBitmap> {
    env.get::<RoaringBitmap>(id)
}

pub trait IPredicate: Send + Sync {
    fn to_sql(&self, env: &Environment) -> Result<String>;
}

/// A bare SQL fragment predicate, the common case for fanned-out
/// distribute/replicate statements where the WHERE clause is copied
/// verbatim to every cascade.
pub struct RawPredicate {
    pub sql_text: String,
}

impl IPredicate for RawPredicate {
    fn to_sql(&self, _env: &Environment) -> Result<String> {
        Ok(self.sql_text.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckIndexBucket {
    MustScan,
    ObtainableAsBitset,
    SearchableByBitset,
    IndexScan,
    FetchableByKey,
}

/// Per-candidate predicate classification. `order_scan`, if set, names
/// the one predicate (by id) whose index also satisfies the required
/// ordering — spec §4.3: "A single 'order scan' slot records an index
/// that also provides the required ordering."
#[derive(Default)]
pub struct CheckIndexArgument {
    buckets: HashMap<u32, CheckIndexBucket>,
    pub order_scan: Option<ObjectId>,
}

impl CheckIndexArgument {
    pub fn new() -> Self {
        CheckIndexArgument::default()
    }

    pub fn classify(&mut self, predicate: ObjectId, bucket: CheckIndexBucket) {
        self.buckets.insert(predicate.0, bucket);
    }

    pub fn bucket_of(&self, predicate: ObjectId) -> Option<CheckIndexBucket> {
        self.buckets.get(&predicate.0).copied()
    }

    pub fn predicates_in(&self, bucket: CheckIndexBucket) -> Vec<ObjectId> {
        self.buckets.iter().filter(|(_, b)| **b == bucket).map(|(id, _)| ObjectId(*id)).collect()
    }
}

/// Per-table state recorded once a candidate is adopted into the
/// execution plan: the chosen file plus the bitset variables threading
/// through the scan (current, previous, search-input) and the chosen
/// order direction.
pub struct AdoptIndexArgument {
    pub chosen_file: Option<String>,
    pub bitset_current: Option<ObjectId>,
    pub bitset_previous: Option<ObjectId>,
    pub bitset_search_input: Option<ObjectId>,
    pub order_direction: Option<OrderDirection>,
}

impl Default for AdoptIndexArgument {
    fn default() -> Self {
        AdoptIndexArgument { chosen_file: None, bitset_current: None, bitset_previous: None, bitset_search_input: None, order_direction: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_and_lookup_round_trip() {
        let mut arg = CheckIndexArgument::new();
        let env = Environment::new();
        let _ = env;
        let id = ObjectId(7);
        arg.classify(id, CheckIndexBucket::IndexScan);
        assert_eq!(arg.bucket_of(id), Some(CheckIndexBucket::IndexScan));
    }

    #[test]
    fn predicates_in_bucket_filters_by_classification() {
        let mut arg = CheckIndexArgument::new();
        arg.classify(ObjectId(1), CheckIndexBucket::MustScan);
        arg.classify(ObjectId(2), CheckIndexBucket::IndexScan);
        arg.classify(ObjectId(3), CheckIndexBucket::IndexScan);
        let mut ids: Vec<u32> = arg.predicates_in(CheckIndexBucket::IndexScan).into_iter().map(|o| o.0).collect();
        ids.sort();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn bitset_round_trips_through_the_environment() {
        let mut env = Environment::new();
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert(3);
        bitmap.insert(9);
        let id = register_bitset(&mut env, bitmap);
        let stored = bitset_of(&env, id).unwrap();
        assert!(stored.contains(3));
        assert!(stored.contains(9));
        assert!(!stored.contains(4));
    }
}
