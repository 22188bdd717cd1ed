pub mod normalizer;
pub mod resolver;
pub mod source;
pub mod transport;

pub use beacon_core::filters::filter_customers;
pub use beacon_core::metrics::derive_metrics;
pub use beacon_core::segmentation::classify_segmentation;
pub use normalizer::{classify_payload, normalize_owners, normalize_single_owner, UpstreamPayload};
pub use resolver::{
    describe_shape, fetch_by_id, fetch_candidates, DetailFetch, FetchOutcome,
    EXHAUSTED_CANDIDATES_MESSAGE,
};
pub use source::{
    CustomerDetailResult, CustomerHubResult, CustomerListResult, CustomerSource,
    SegmentationResult,
};
pub use transport::{HttpTransport, StaticTransport, TransportError, UpstreamTransport};
