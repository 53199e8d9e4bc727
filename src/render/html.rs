//! HTML rendering for tables with merged cells.

use crate::model::Table;

/// Render a table as an HTML `<table>` with `rowspan`/`colspan` attributes.
pub fn table_to_html(table: &Table) -> String {
    let mut html = String::from("<table>\n");

    for row in 0..table.row_count() {
        html.push_str("  <tr>");
        for cell in table.row_cells(row) {
            html.push_str("<td");
            if cell.rowspan > 1 {
                html.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
            }
            if cell.colspan > 1 {
                html.push_str(&format!(" colspan=\"{}\"", cell.colspan));
            }
            html.push('>');
            html.push_str(&escape(cell.text.trim()).replace('\n', "<br>"));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n");
    html
}

/// Render several tables, each preceded by a comment naming its first page.
pub fn tables_to_html(tables: &[Table]) -> String {
    tables
        .iter()
        .map(|t| format!("<!-- page {} -->\n{}", t.start_page_num, table_to_html(t)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
