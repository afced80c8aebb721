use crate::repository::batch_mutate::BatchMutate;
use crate::repository::clock::Clock;
use crate::repository::find_by_filters::FindByFilters;
use crate::repository::load::Load;
use crate::repository::persist::Persist;

/// Everything the history layer needs from a primary store.
pub trait RecordStore: Load + FindByFilters + Persist + BatchMutate + Clock {}

impl<T> RecordStore for T where T: Load + FindByFilters + Persist + BatchMutate + Clock {}
