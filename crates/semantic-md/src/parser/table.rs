//! HTML table parsing module, processes the conversion of table elements

use ecow::{EcoString, eco_format};
use markup5ever_rcdom::Handle;

use crate::ast::{Table, TableCell, TableRow};
use crate::dom;

use super::core::HtmlToAstParser;

/// Table parser
pub struct TableParser;

impl TableParser {
    /// Convert an HTML table to a [`Table`].
    ///
    /// Rows are the direct `tr` children of the table together with the `tr`
    /// children of its direct `thead`, `tbody` and `tfoot` sections, in
    /// document order. Only `th` and `td` children become cells.
    pub fn convert_table(parser: &HtmlToAstParser, element: &Handle, depth: usize) -> Table {
        let track_columns = parser.opts.enable_table_column_tracking;
        let mut table = Table::default();

        for (row_idx, row) in Self::find_rows(element).iter().enumerate() {
            let cells = dom::element_children(row)
                .iter()
                .filter(|cell| dom::is_element(cell, "th") || dom::is_element(cell, "td"))
                .enumerate()
                .map(|(col_idx, cell)| TableCell {
                    content: parser.convert_children(cell, depth + 1),
                    col_id: track_columns.then(|| generate_column_id(col_idx)),
                    colspan: Self::span(cell, "colspan"),
                    rowspan: Self::span(cell, "rowspan"),
                    is_header: dom::is_element(cell, "th"),
                })
                .collect::<Vec<_>>();

            if row_idx == 0 {
                table.has_header = !cells.is_empty() && cells.iter().all(|cell| cell.is_header);
                table.col_ids = cells.iter().filter_map(|cell| cell.col_id.clone()).collect();
            }

            table.rows.push(TableRow { cells });
        }

        table
    }

    fn find_rows(table: &Handle) -> Vec<Handle> {
        let mut rows = Vec::new();
        for child in dom::element_children(table) {
            match dom::tag_name(&child) {
                Some("tr") => rows.push(child),
                Some("thead" | "tbody" | "tfoot") => rows.extend(
                    dom::element_children(&child)
                        .into_iter()
                        .filter(|row| dom::is_element(row, "tr")),
                ),
                _ => {}
            }
        }
        rows
    }

    /// A `colspan`/`rowspan` value; anything but a positive decimal number
    /// counts as 1.
    fn span(cell: &Handle, key: &str) -> u32 {
        dom::attr(cell, key)
            .filter(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|&span| span > 0)
            .unwrap_or(1)
    }
}

/// Generates the spreadsheet-style ID of a zero-based column index:
/// `0 -> A`, `25 -> Z`, `26 -> AA`, `701 -> ZZ`.
pub fn generate_column_id(index: usize) -> EcoString {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();

    eco_format!("{}", String::from_utf8_lossy(&letters))
}
