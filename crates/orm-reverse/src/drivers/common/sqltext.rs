//! Regex-level statement rewrites shared by the SQL Server family platforms.
//!
//! None of this parses SQL. Each helper checks the one shape it needs and
//! fails with [`ReverseError::Rewrite`] instead of guessing.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::core::params::{BoundParam, LobStream, ParamValue};
use crate::core::schema::Database;
use crate::error::{ReverseError, Result};

static SELECT_FROM: OnceLock<Regex> = OnceLock::new();
static DISTINCT: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> Result<&'static Regex> {
    if let Some(re) = cell.get() {
        return Ok(re);
    }
    let re = Regex::new(pattern)
        .map_err(|e| ReverseError::Rewrite(format!("invalid pattern {}: {}", pattern, e)))?;
    Ok(cell.get_or_init(|| re))
}

/// A SELECT statement split into its select list and FROM tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectParts {
    pub distinct: bool,
    pub select: String,
    pub from: String,
}

impl SelectParts {
    /// `SELECT [DISTINCT ]<prefix><select> FROM <from>`.
    pub fn render(&self, prefix: &str, from: &str) -> String {
        format!(
            "SELECT {}{}{} FROM {}",
            if self.distinct { "DISTINCT " } else { "" },
            prefix,
            self.select,
            from
        )
    }
}

/// Reject negative offsets and limits before any rewriting happens.
pub fn check_limit_args(offset: i64, limit: i64) -> Result<()> {
    if offset < 0 || limit < 0 {
        return Err(ReverseError::Config(format!(
            "offset and limit must not be negative (offset = {}, limit = {})",
            offset, limit
        )));
    }
    Ok(())
}

/// Split `SELECT ... FROM ...`, pulling a leading DISTINCT out of the select
/// list. The statement must start with SELECT and contain a FROM.
pub fn split_select(sql: &str) -> Result<SelectParts> {
    let select_from = cached(&SELECT_FROM, r"(?is)\A\s*select\s+(.*?)\s+from\s+(.*?)\s*\z")?;
    let caps = select_from.captures(sql).ok_or_else(|| {
        ReverseError::Rewrite(format!(
            "could not locate the select statement at the start of the query: {}",
            sql
        ))
    })?;
    let mut select = caps[1].trim().to_string();
    let from = caps[2].trim().to_string();

    let distinct = cached(&DISTINCT, r"(?is)\Adistinct\s+")?;
    let is_distinct = match distinct.find(&select) {
        Some(m) => {
            select = select[m.end()..].to_string();
            true
        }
        None => false,
    };

    Ok(SelectParts {
        distinct: is_distinct,
        select,
        from,
    })
}

/// `SELECT [DISTINCT ]TOP n ...`, the zero-offset rewrite.
pub fn top_n(parts: &SelectParts, limit: i64) -> String {
    parts.render(&format!("TOP {} ", limit), &parts.from)
}

/// Split a trailing ORDER BY that is not nested in parentheses or quotes.
///
/// Returns the text before it and the clause after `ORDER BY`.
pub fn split_order_by(tail: &str) -> (&str, Option<&str>) {
    let bytes = tail.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut found = None;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'[' => quote = Some(b']'),
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ if depth == 0 && starts_keyword(bytes, i, b"order") => {
                    let mut j = i + 5;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j > i + 5 && starts_keyword(bytes, j, b"by") {
                        found = Some((i, j + 2));
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    match found {
        Some((start, end)) => (tail[..start].trim_end(), Some(tail[end..].trim())),
        None => (tail, None),
    }
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn starts_keyword(bytes: &[u8], at: usize, keyword: &[u8]) -> bool {
    let end = at + keyword.len();
    end <= bytes.len()
        && bytes[at..end].eq_ignore_ascii_case(keyword)
        && (at == 0 || !is_word(bytes[at - 1]))
        && (end == bytes.len() || !is_word(bytes[end]))
}

/// Reduce an ORDER BY clause to bare column names with their direction, so
/// it can be replayed over a derived table.
///
/// Only plain, optionally qualified column references are accepted.
pub fn unqualified_order_items(clause: &str) -> Result<String> {
    if clause.contains('(') {
        return Err(ReverseError::Unsupported(format!(
            "ORDER BY expressions cannot be replayed over a window: {}",
            clause
        )));
    }
    let mut items = Vec::new();
    for item in clause.split(',') {
        let tokens: Vec<&str> = item.split_whitespace().collect();
        let (column, direction) = match tokens.as_slice() {
            [column] => (*column, None),
            [column, dir] if dir.eq_ignore_ascii_case("asc") || dir.eq_ignore_ascii_case("desc") => {
                (*column, Some(dir.to_ascii_uppercase()))
            }
            _ => {
                return Err(ReverseError::Unsupported(format!(
                    "ORDER BY item is not a plain column reference: {}",
                    item.trim()
                )))
            }
        };
        let plain = column
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '"' | '$'));
        if !plain || column.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ReverseError::Unsupported(format!(
                "ORDER BY item is not a plain column reference: {}",
                column
            )));
        }
        let name = column.rsplit('.').next().unwrap_or(column);
        items.push(match direction {
            Some(dir) => format!("{} {}", name, dir),
            None => name.to_string(),
        });
    }
    Ok(items.join(", "))
}

enum Placeholder {
    Inline(String),
    Renumber(usize),
}

fn read_stream(stream: &mut dyn LobStream) -> std::io::Result<Vec<u8>> {
    stream.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Inline streamed LOB parameters as `0x<hex>` literals and renumber the
/// remaining `:pN` placeholders contiguously.
///
/// The i-th parameter (1-based) is bound to `:p<i>`. A parameter is inlined
/// when its column is a LOB column of `database` and its value is a stream.
/// Every such stream is read to the end and dropped before this returns; the
/// first read failure is reported after all of them have been consumed.
///
/// On error `sql` is left as it was while `params` has already lost its LOB
/// streams, so the two no longer match and must both be discarded.
pub fn inline_lob_params(
    sql: &mut String,
    params: &mut Vec<BoundParam>,
    database: &Database,
) -> Result<()> {
    let taken = std::mem::take(params);
    let mut kept = Vec::with_capacity(taken.len());
    let mut mapping = HashMap::with_capacity(taken.len());
    let mut first_error: Option<std::io::Error> = None;

    for (i, param) in taken.into_iter().enumerate() {
        let position = i + 1;
        let lob_column = match (&param.table, &param.column) {
            (Some(table), Some(column)) => database
                .column(table, column)
                .map(|c| c.is_lob())
                .unwrap_or(false),
            _ => false,
        };

        match param.value {
            ParamValue::Stream(mut stream) if lob_column => {
                match read_stream(stream.as_mut()) {
                    Ok(bytes) => {
                        debug!("Inlining {} byte LOB for :p{}", bytes.len(), position);
                        mapping.insert(
                            position,
                            Placeholder::Inline(format!("0x{}", hex::encode(bytes))),
                        );
                    }
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            value => {
                kept.push(BoundParam { value, ..param });
                mapping.insert(position, Placeholder::Renumber(kept.len()));
            }
        }
    }

    *params = kept;
    if let Some(e) = first_error {
        return Err(ReverseError::Io(e));
    }

    let placeholder = cached(&PLACEHOLDER, r":p(\d+)")?;
    let rewritten = placeholder.replace_all(sql, |caps: &Captures| {
        let original = &caps[0];
        let index = caps[1].parse::<usize>().ok();
        match index.and_then(|n| mapping.get(&n)) {
            Some(Placeholder::Inline(literal)) => literal.clone(),
            Some(Placeholder::Renumber(n)) => format!(":p{}", n),
            None => original.to_string(),
        }
    });
    *sql = rewritten.into_owned();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Column, Domain, Table};
    use crate::core::types::LogicalType;
    use std::io::{Cursor, Error, ErrorKind};

    fn docs() -> Database {
        let mut db = Database::new("files");
        let mut t = Table::new("docs", "Docs");
        t.add_column(Column::new("id", "Id", Domain::new(LogicalType::Integer, "INT")))
            .unwrap();
        t.add_column(Column::new("body", "Body", Domain::new(LogicalType::Blob, "VARBINARY(MAX)")))
            .unwrap();
        t.add_column(Column::new("title", "Title", Domain::new(LogicalType::Varchar, "VARCHAR")))
            .unwrap();
        db.add_table(t).unwrap();
        db
    }

    #[test]
    fn test_split_select_basic() {
        let parts = split_select("SELECT a, b FROM t WHERE x = 1").unwrap();
        assert!(!parts.distinct);
        assert_eq!(parts.select, "a, b");
        assert_eq!(parts.from, "t WHERE x = 1");
    }

    #[test]
    fn test_split_select_distinct_and_newlines() {
        let parts = split_select("  select distinct\n  a\nfrom t").unwrap();
        assert!(parts.distinct);
        assert_eq!(parts.select, "a");
        assert_eq!(top_n(&parts, 5), "SELECT DISTINCT TOP 5 a FROM t");
    }

    #[test]
    fn test_split_select_rejects_other_statements() {
        assert!(matches!(
            split_select("UPDATE t SET a = 1"),
            Err(ReverseError::Rewrite(_))
        ));
        assert!(split_select("SELECT 1").is_err());
    }

    #[test]
    fn test_bracketed_from_column_is_not_a_keyword() {
        let parts = split_select("SELECT [from], b FROM t").unwrap();
        assert_eq!(parts.select, "[from], b");
        assert_eq!(parts.from, "t");
    }

    #[test]
    fn test_negative_limit_args() {
        assert!(check_limit_args(0, 10).is_ok());
        assert!(matches!(check_limit_args(-1, 10), Err(ReverseError::Config(_))));
        assert!(check_limit_args(0, -1).is_err());
    }

    #[test]
    fn test_split_order_by_ignores_nested() {
        let (head, order) = split_order_by("t WHERE id IN (SELECT id FROM u ORDER BY id) ORDER BY t.name DESC");
        assert_eq!(head, "t WHERE id IN (SELECT id FROM u ORDER BY id)");
        assert_eq!(order, Some("t.name DESC"));

        let (head, order) = split_order_by("t WHERE note = 'order by'");
        assert_eq!(head, "t WHERE note = 'order by'");
        assert_eq!(order, None);

        let (_, order) = split_order_by("t WHERE border_by = 1");
        assert_eq!(order, None);
    }

    #[test]
    fn test_unqualified_order_items() {
        assert_eq!(
            unqualified_order_items("t.name DESC, [id]").unwrap(),
            "name DESC, [id]"
        );
        assert!(matches!(
            unqualified_order_items("LEN(name)"),
            Err(ReverseError::Unsupported(_))
        ));
        assert!(unqualified_order_items("name COLLATE Latin1_General_CI_AS").is_err());
        assert!(unqualified_order_items("2").is_err());
    }

    #[test]
    fn test_inline_lob_param_and_renumber() {
        let db = docs();
        let mut sql = "INSERT INTO docs (id, body, title) VALUES (:p1, :p2, :p3)".to_string();
        let mut params = vec![
            BoundParam::for_column("docs", "id", ParamValue::Int(7)),
            BoundParam::for_column("docs", "body", ParamValue::stream(Cursor::new(vec![0xDE, 0xAD]))),
            BoundParam::for_column("docs", "title", ParamValue::Text("x".into())),
        ];
        inline_lob_params(&mut sql, &mut params, &db).unwrap();
        assert_eq!(sql, "INSERT INTO docs (id, body, title) VALUES (:p1, 0xdead, :p2)");
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].column.as_deref(), Some("title"));
    }

    #[test]
    fn test_stream_is_rewound_before_reading() {
        let db = docs();
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        cursor.set_position(3);
        let mut sql = "UPDATE docs SET body = :p1".to_string();
        let mut params = vec![BoundParam::for_column("docs", "body", ParamValue::stream(cursor))];
        inline_lob_params(&mut sql, &mut params, &db).unwrap();
        assert_eq!(sql, "UPDATE docs SET body = 0x010203");
        assert!(params.is_empty());
    }

    #[test]
    fn test_renumbering_does_not_confuse_p1_and_p10() {
        let db = docs();
        let mut params = vec![BoundParam::for_column(
            "docs",
            "body",
            ParamValue::stream(Cursor::new(vec![0xFF])),
        )];
        let mut sql = String::from("SELECT :p1");
        for i in 2..=11 {
            params.push(BoundParam::new(ParamValue::Int(i)));
            sql.push_str(&format!(", :p{}", i));
        }
        inline_lob_params(&mut sql, &mut params, &db).unwrap();
        assert_eq!(
            sql,
            "SELECT 0xff, :p1, :p2, :p3, :p4, :p5, :p6, :p7, :p8, :p9, :p10"
        );
        assert_eq!(params.len(), 10);
    }

    #[test]
    fn test_stream_on_non_lob_column_is_kept() {
        let db = docs();
        let mut sql = "UPDATE docs SET title = :p1".to_string();
        let mut params = vec![BoundParam::for_column(
            "docs",
            "title",
            ParamValue::stream(Cursor::new(b"abc".to_vec())),
        )];
        inline_lob_params(&mut sql, &mut params, &db).unwrap();
        assert_eq!(sql, "UPDATE docs SET title = :p1");
        assert!(params[0].value.is_stream());
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(Error::new(ErrorKind::Other, "disk gone"))
        }
    }

    impl Seek for Broken {
        fn seek(&mut self, _: SeekFrom) -> std::io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_read_failure_consumes_streams_and_leaves_sql() {
        let db = docs();
        let mut sql = "UPDATE docs SET body = :p1 WHERE id = :p2 OR body = :p3".to_string();
        let mut params = vec![
            BoundParam::for_column("docs", "body", ParamValue::stream(Broken)),
            BoundParam::new(ParamValue::Int(1)),
            BoundParam::for_column("docs", "body", ParamValue::stream(Cursor::new(vec![1]))),
        ];
        let err = inline_lob_params(&mut sql, &mut params, &db).unwrap_err();
        assert!(matches!(err, ReverseError::Io(_)));
        assert_eq!(sql, "UPDATE docs SET body = :p1 WHERE id = :p2 OR body = :p3");
        assert_eq!(params.len(), 1);
        assert!(!params.iter().any(|p| p.value.is_stream()));
    }
}
