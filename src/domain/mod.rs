pub mod address;
pub mod listing;
pub mod location;

pub use address::normalize_address;
pub use listing::{Listing, RawListing};
pub use location::LocationLabel;
