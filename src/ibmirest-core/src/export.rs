//! Table serialization to CSV, XML and JSON, as text or files.

use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::table::{cell_text, ColumnType, Table};

/// Default element name for rows in XML output
pub const DEFAULT_XML_TABLE_NAME: &str = "Table1";

/// CSV layout options.
///
/// Values are wrapped in `quote` and joined with `separator` without any
/// escaping, so both must be chosen so they never occur in the data.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub separator: String,
    pub quote: String,
    pub include_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            quote: "\"".to_string(),
            include_header: true,
        }
    }
}

impl Table {
    /// One line per row (plus the header line), each with exactly
    /// `column_count()` fields. A table without columns yields no lines.
    pub fn to_csv(&self, options: &CsvOptions) -> String {
        let quote = |text: &str| format!("{}{}{}", options.quote, text, options.quote);
        let mut out = String::new();
        if self.column_count() == 0 {
            return out;
        }

        if options.include_header {
            let header: Vec<String> = self.columns().iter().map(|c| quote(&c.name)).collect();
            out.push_str(&header.join(&options.separator));
            out.push('\n');
        }

        for row in self.rows() {
            let fields: Vec<String> = row.iter().map(|cell| quote(&cell_text(cell))).collect();
            out.push_str(&fields.join(&options.separator));
            out.push('\n');
        }

        out
    }

    /// XML document with one `table_name` element per row. Null cells are
    /// omitted, matching how the service's own XML consumers expect them.
    pub fn to_xml(&self, table_name: &str, include_schema: bool) -> String {
        let table_tag = encode_xml_name(table_name);
        let column_tags: Vec<String> = self
            .columns()
            .iter()
            .map(|c| encode_xml_name(&c.name))
            .collect();

        let mut out = String::from("<?xml version=\"1.0\" standalone=\"yes\"?>\n<DocumentElement>\n");

        if include_schema {
            out.push_str(
                "  <xs:schema id=\"DocumentElement\" xmlns=\"\" \
                 xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">\n",
            );
            out.push_str("    <xs:element name=\"DocumentElement\">\n");
            out.push_str("      <xs:complexType>\n");
            out.push_str("        <xs:choice minOccurs=\"0\" maxOccurs=\"unbounded\">\n");
            out.push_str(&format!("          <xs:element name=\"{}\">\n", table_tag));
            out.push_str("            <xs:complexType>\n");
            out.push_str("              <xs:sequence>\n");
            for (column, tag) in self.columns().iter().zip(&column_tags) {
                out.push_str(&format!(
                    "                <xs:element name=\"{}\" type=\"{}\" minOccurs=\"0\" />\n",
                    tag,
                    xsd_type(column.column_type)
                ));
            }
            out.push_str("              </xs:sequence>\n");
            out.push_str("            </xs:complexType>\n");
            out.push_str("          </xs:element>\n");
            out.push_str("        </xs:choice>\n");
            out.push_str("      </xs:complexType>\n");
            out.push_str("    </xs:element>\n");
            out.push_str("  </xs:schema>\n");
        }

        for row in self.rows() {
            out.push_str(&format!("  <{}>\n", table_tag));
            for (cell, tag) in row.iter().zip(&column_tags) {
                if cell.is_some() {
                    out.push_str(&format!(
                        "    <{}>{}</{}>\n",
                        tag,
                        escape_xml_text(&cell_text(cell)),
                        tag
                    ));
                }
            }
            out.push_str(&format!("  </{}>\n", table_tag));
        }

        out.push_str("</DocumentElement>\n");
        out
    }

    /// JSON array of row objects, keys in column order
    pub fn to_json_value(&self) -> Value {
        Value::Array(
            self.rows()
                .iter()
                .map(|row| {
                    let map: Map<String, Value> = self
                        .columns()
                        .iter()
                        .zip(row)
                        .map(|(col, cell)| (col.name.clone(), cell.clone().unwrap_or(Value::Null)))
                        .collect();
                    Value::Object(map)
                })
                .collect(),
        )
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let value = self.to_json_value();
        let text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>, options: &CsvOptions, replace: bool) -> Result<()> {
        write_output(path.as_ref(), &self.to_csv(options), replace)
    }

    pub fn write_xml(
        &self,
        path: impl AsRef<Path>,
        table_name: &str,
        include_schema: bool,
        replace: bool,
    ) -> Result<()> {
        write_output(path.as_ref(), &self.to_xml(table_name, include_schema), replace)
    }

    pub fn write_json(&self, path: impl AsRef<Path>, pretty: bool, replace: bool) -> Result<()> {
        write_output(path.as_ref(), &self.to_json(pretty)?, replace)
    }
}

/// Write `contents` to `path`. Without `replace`, an existing file is an
/// error and is left untouched.
pub fn write_output(path: &Path, contents: &str, replace: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if replace {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            CoreError::FileExists(path.to_path_buf())
        } else {
            CoreError::Io(e)
        }
    })?;
    file.write_all(contents.as_bytes())?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote output file");
    Ok(())
}

fn xsd_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Boolean => "xs:boolean",
        ColumnType::Integer => "xs:long",
        ColumnType::Float => "xs:double",
        ColumnType::Unknown | ColumnType::String | ColumnType::Json => "xs:string",
    }
}

fn escape_xml_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Make a column name usable as an element name. Characters that are not
/// allowed are written as `_xHHHH_`.
fn encode_xml_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let allowed = if i == 0 {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
        };
        if allowed {
            out.push(c);
        } else {
            out.push_str(&format!("_x{:04X}_", c as u32));
        }
    }
    out
}
