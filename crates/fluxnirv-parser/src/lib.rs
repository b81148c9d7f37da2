pub mod formats;
pub mod model;

pub use formats::{EpicFormat, EpicSchema, SiteFormat, SiteSchema};
pub use model::{
    CompactTimestamp, EpicRecord, EpicRowKind, SiteField, SiteRecord, SiteRowKind,
};
