// EduCheck Core Services
// The four pipeline stages plus configuration storage

pub mod classifier;
pub mod config_store;
pub mod extractor;
pub mod report;
pub mod segmenter;

pub use classifier::{shared_classifier, ClassifierClient, ClassifierError};
pub use config_store::{AppConfig, ClassifierConfig, ConfigStore};
pub use extractor::{extract_text, mime_for_extension, ExtractError};
pub use report::{build_report, compute_verdict, render_certificate, EmptyDocumentError, TOOL_NAME};
pub use segmenter::chunk_text;
