// ABOUTME: Spreadsheet collaborator used by the sync pipeline
// ABOUTME: Defines the Spreadsheet trait and A1 range helpers shared by implementations

pub mod auth;
pub mod client;

pub use auth::ServiceAccountKey;
pub use client::SheetsClient;

use anyhow::Result;
use async_trait::async_trait;

/// A row-major block of cell strings returned for one requested range.
///
/// Trailing blank rows and trailing blank cells may be missing.
pub type CellGrid = Vec<Vec<String>>;

/// The spreadsheet operations the sync pipeline relies on.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Read one column of a worksheet as strings, top to bottom.
    ///
    /// `range` is an A1 column range such as `A2:A`. Blank cells between
    /// values come back as empty strings; trailing blanks are dropped.
    async fn column_values(&self, sheet: &str, range: &str) -> Result<Vec<String>>;

    /// Fetch several rectangular ranges of one worksheet in a single call.
    ///
    /// The result has one grid per requested range, in request order.
    async fn batch_get(&self, sheet: &str, ranges: &[String]) -> Result<Vec<CellGrid>>;

    /// Clear the values of the given ranges of one worksheet.
    async fn batch_clear(&self, sheet: &str, ranges: &[String]) -> Result<()>;
}

/// Prefix an A1 range with a quoted worksheet name: `'my sheet'!A1:K2`.
///
/// Single quotes inside the name are doubled.
pub fn qualify_range(sheet: &str, range: &str) -> String {
    format!("'{}'!{}", sheet.replace('\'', "''"), range)
}
