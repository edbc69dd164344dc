pub mod alias_index;
pub mod annotate;
pub mod coverage;
pub mod error;
pub mod normalize;
pub mod reference;
pub mod resolver;

pub use error::{Result, TerritoryError};
pub use normalize::normalize;
pub use reference::ReferenceData;
pub use resolver::{TerritoryIdentity, TerritoryLevel, TerritoryResolver};
