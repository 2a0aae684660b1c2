//! HTML page assembly.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::record::{Kind, Record};
use crate::template::{escape_html, form_template, TemplateSet, INDEX, LIST};

/// Landing page with links to every form and list.
///
/// # Errors
///
/// Returns an error if the landing template is missing.
pub fn landing(templates: &TemplateSet) -> Result<String> {
    templates.render(INDEX, &Map::new())
}

/// Edit form for `kind`, prefilled from `record` when one was found.
///
/// # Errors
///
/// Returns an error if the form template is missing or the record cannot be
/// serialized.
pub fn form(templates: &TemplateSet, kind: Kind, record: Option<&Record>) -> Result<String> {
    let title = match record {
        Some(record) => record.label(),
        None => "новый".to_string(),
    };

    let mut context = Map::new();
    context.insert("kind".into(), Value::from(kind.as_str()));
    context.insert("title".into(), Value::from(title));
    context.insert("record_json".into(), Value::from(script_json(record)?));
    templates.render(form_template(kind), &context)
}

/// Listing page for every stored record of `kind`.
///
/// # Errors
///
/// Returns an error if the list template is missing.
pub fn list(templates: &TemplateSet, kind: Kind, records: &[Record]) -> Result<String> {
    let mut rows = String::new();
    for record in records {
        let id = escape_html(&record.id_text().unwrap_or_default());
        let _ = writeln!(
            rows,
            "<tr><td>{id}</td><td><a href=\"/{kind}?id={id}\">{label}</a></td><td>{created}</td>\
             <td><a href=\"/{kind}/{id}/pdf\">PDF</a> <button type=\"button\" data-delete=\"{id}\">Удалить</button></td></tr>",
            label = escape_html(&record.label()),
            created = escape_html(record.created_at().unwrap_or_default()),
        );
    }

    let mut context = Map::new();
    context.insert("kind".into(), Value::from(kind.as_str()));
    context.insert("title".into(), Value::from(kind.title()));
    context.insert("count".into(), Value::from(records.len()));
    context.insert("rows".into(), Value::from(rows));
    templates.render(LIST, &context)
}

/// JSON for an inline `<script>` block. `<`, `>` and `&` are escaped so a
/// field value cannot close the script element.
fn script_json(record: Option<&Record>) -> Result<String> {
    let json = match record {
        Some(record) => serde_json::to_string(record)?,
        None => "null".to_string(),
    };
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}
