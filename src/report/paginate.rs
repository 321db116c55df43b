use serde::Serialize;

use super::model::DayEntry;
use super::money::SummaryRow;

/// Rows per detail sheet; 16 rows plus headers and the totals row fit an A4
/// landscape page.
pub const DEFAULT_PAGE_SIZE: usize = 16;

/// One sheet of the day-by-day detail table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPage {
    pub index: usize,
    pub entries: Vec<DayEntry>,
    pub is_last: bool,
    /// Aggregated totals; only ever set on the last page
    pub totals: Option<SummaryRow>,
}

impl DetailPage {
    /// Printed page number. Page 1 is the summary sheet.
    pub fn number(&self) -> usize {
        self.index + 2
    }
}

/// Split the chronological entries into consecutive pages of at most
/// `page_size` rows. The last page is flagged but carries no totals yet.
pub fn paginate(entries: &[DayEntry], page_size: usize) -> Vec<DetailPage> {
    let page_size = page_size.max(1);
    let page_count = entries.len().div_ceil(page_size);

    entries
        .chunks(page_size)
        .enumerate()
        .map(|(index, chunk)| DetailPage {
            index,
            entries: chunk.to_vec(),
            is_last: index + 1 == page_count,
            totals: None,
        })
        .collect()
}

/// Total printed pages for a report with `detail_pages` detail sheets
pub fn total_pages(detail_pages: usize) -> usize {
    detail_pages + 1
}
