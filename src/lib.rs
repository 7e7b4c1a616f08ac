pub mod api;
pub mod config;
pub mod edit;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::{ApiClient, ApiError, HttpApi, MemoryApi};

// Export logic types
pub use logic::{
    build_grouped_view, completeness, missing_groups, resolve, unused_attribute_ids, validate,
    CompletenessScore, GroupedView, PhonePolicy, ValidationError, ValidationOptions,
};

// Export all model types
pub use model::*;

// Export editing types
pub use edit::{
    AttributeEditor, BulkAddReport, EditSession, EditState, EditorError, Mutation, UserContext,
};

// Export store types
pub use store::{AssetSoftCache, CacheKey, ValueCache};
