// The ingestion-and-normalization pipeline. Data flows strictly forward:
// raw bytes → RawTable (ingest) → rename map (columns) → NormalizedRecords
// (normalize) → session state / export.
pub mod columns;
pub mod export;
pub mod ingest;
pub mod normalize;
pub mod session;
