pub mod adapter;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod segmentation;

pub use adapter::{map_owner_to_customer, map_owner_to_customer_detail};
pub use domain::customer::{Customer, CustomerDetail, CustomerId, Pet};
pub use domain::filter::{CustomerFilterState, HealthBucket, HubFilterState, MrrBucket, PetsBucket};
pub use domain::metrics::{
    ChurnRisk, CustomerInteraction, CustomerStage, CustomerSuccessMetrics, InteractionChannel,
};
pub use domain::owner::{RawOwnerRecord, RawPet, RawPetType};
pub use domain::segment::{
    CustomerHubRow, CustomerSegmentationEntry, Segment, SegmentationSummary,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use filters::{SortDirection, SortField, SortKey, SortSpec, SortSpecError};
pub use metrics::{derive_metrics, generate_interactions, ParkMillerLcg};
pub use segmentation::{build_hub_rows, classify_segmentation, summarize};
