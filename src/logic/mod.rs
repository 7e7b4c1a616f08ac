pub mod completeness;
pub mod grouping;
pub mod resolve;
pub mod validate;

pub use completeness::{completeness, CompletenessScore};
pub use grouping::{
    build_grouped_view, missing_groups, unused_attribute_ids, GroupBucket, GroupedView, UNGROUPED,
};
pub use resolve::resolve;
pub use validate::{validate, PhonePolicy, ValidationError, ValidationOptions};
