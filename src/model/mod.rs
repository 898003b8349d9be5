pub mod model_metadata;
pub mod model_storage;
pub mod label_encoder;
pub mod artifacts;
pub mod config;

pub use model_metadata::ArtifactMetadata;
pub use model_storage::{save_artifact_bundle, load_artifact_bundle, load_metadata, print_metadata_info, ArtifactBundle};
pub use label_encoder::LabelEncoder;
pub use artifacts::{CropArtifacts, ModelInfo};
#[cfg(feature = "ml")]
pub use artifacts::bundle_artifact_files;
pub use config::{AppConfig, ArtifactSettings, DeviceType, ReportSettings};
