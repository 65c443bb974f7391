pub mod catalog;
pub mod directory;
pub mod profile;

pub use catalog::CatalogService;
pub use directory::{ProviderDirectory, SupabaseProviderDirectory};
pub use profile::ProfileService;
