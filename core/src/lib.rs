pub mod classify;
pub mod fingerprint;
pub mod ingest;
pub mod probe;
pub mod resolver;
pub mod scanner;
