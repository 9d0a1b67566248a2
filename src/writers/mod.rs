pub mod ingest_client;

pub use ingest_client::{CollectionSpec, IngestClient, RegistrationOutcome, UploadOutcome};
