pub mod errors;

pub use errors::StickySyncError;
