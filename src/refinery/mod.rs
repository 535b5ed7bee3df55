// * The Refinery (Extraction Pipeline)
// * Decodes the structured-data block, resolves every field through its fallback chain,
// * and builds a typed record for the classified entity.

pub mod classifier;
pub mod fields;
pub mod page;
pub mod registry;
pub mod structured_data;

// * Re-exports for convenient access
pub use classifier::{classify, Classification, MediaKind};
pub use fields::{scan_countries_fragment, FragmentScan, Repair};
pub use page::PageView;
pub use registry::{FieldChain, Probe, Resolved, Strategy};
pub use structured_data::{decode, Credit, DecodeError, DecodedPage, StructuredData};
