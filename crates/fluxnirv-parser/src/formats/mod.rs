mod epic;
mod site;

pub use epic::{EpicFormat, EpicSchema};
pub use site::{SiteFormat, SiteSchema};

pub(crate) fn cells(record: &csv::StringRecord) -> Vec<String> {
    record.iter().map(|cell| cell.to_string()).collect()
}
