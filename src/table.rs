//! Comma-delimited tables with a header row, held column-wise.

use csv::ReaderBuilder;

/// Cell texts read as missing, matching the default NA strings of the
/// tooling that writes and reads these logs.
pub const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    /// `columns[c][r]`; `None` where the cell is missing or the row is short.
    pub columns: Vec<Vec<Option<String>>>,
    pub row_count: usize,
}

impl Table {
    pub fn parse(raw: &[u8]) -> Result<Self, String> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(raw);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err("missing header row".to_string());
        }

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut row_count = 0usize;
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            if record.len() > headers.len() {
                return Err(format!(
                    "row {} has {} fields, header has {}",
                    row_count + 1,
                    record.len(),
                    headers.len()
                ));
            }
            for (c, column) in columns.iter_mut().enumerate() {
                let cell = record.get(c).filter(|v| !is_missing(v));
                column.push(cell.map(|v| v.to_string()));
            }
            row_count += 1;
        }

        Ok(Self {
            headers,
            columns,
            row_count,
        })
    }

    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|idx| self.columns[idx].as_slice())
    }
}

/// Numeric reading of a cell; booleans count as 0/1.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns_and_missing_cells() {
        let t = Table::parse(b"a,b\n1,\n2,3\n4\n").unwrap();
        assert_eq!(t.headers, vec!["a", "b"]);
        assert_eq!(t.row_count, 3);
        let b = t.column("b").unwrap();
        assert_eq!(b[0], None);
        assert_eq!(b[1].as_deref(), Some("3"));
        assert_eq!(b[2], None);
    }

    #[test]
    fn test_missing_tokens_are_none() {
        let t = Table::parse(b"a\nnan\nNA\nN/A\nnull\n<NA>\n 7 \n").unwrap();
        let a = t.column("a").unwrap();
        assert_eq!(a.iter().filter(|c| c.is_none()).count(), 5);
        assert_eq!(a[5].as_deref(), Some(" 7 "));
        assert!(!is_missing("0"));
        assert!(!is_missing("none"));
    }

    #[test]
    fn test_quoted_header_with_comma() {
        let t = Table::parse(b"\"x, y\",z\n1,2\n").unwrap();
        assert_eq!(t.headers[0], "x, y");
    }

    #[test]
    fn test_rejects_overlong_rows() {
        assert!(Table::parse(b"a,b\n1,2,3\n").is_err());
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert!(Table::parse(b"").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("True"), Some(1.0));
        assert_eq!(parse_number("off"), None);
    }
}
