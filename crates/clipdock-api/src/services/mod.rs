pub mod upload;

pub use upload::{AssetKind, UploadService};
