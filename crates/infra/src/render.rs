//! HTML rendering of invoices.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use invoicer_core::{DomainError, format_amount};
use invoicer_invoicing::{Client, Consultant, Invoice};

/// File name of the operator-supplied template inside the templates directory.
pub const INVOICE_TEMPLATE_FILE: &str = "invoice_template.html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("reading template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template uses unknown placeholder {{{{ {0} }}}}")]
    UnknownPlaceholder(String),

    #[error("template has an unterminated placeholder")]
    UnterminatedPlaceholder,

    #[error(transparent)]
    Amount(#[from] DomainError),
}

/// Rendered HTML, opaque to the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

pub trait Renderer {
    fn render(
        &self,
        consultant: &Consultant,
        client: &Client,
        invoice: &Invoice,
    ) -> Result<RenderedDocument, RenderError>;
}

/// `{{ key }}` placeholder substitution over an HTML template.
///
/// Keys: `consultant.*` and `client.*` (every record field), `invoice.number`,
/// `invoice.date`, `invoice.total`, and `services` (pre-rendered `<tr>` rows).
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    template: String,
}

impl HtmlRenderer {
    pub fn builtin() -> Self {
        Self {
            template: BUILTIN_TEMPLATE.to_string(),
        }
    }

    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Use `invoice_template.html` from `templates_dir` when present, the
    /// built-in layout otherwise.
    pub fn load(templates_dir: &Path) -> Result<Self, RenderError> {
        let path = templates_dir.join(INVOICE_TEMPLATE_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no invoice template, using built-in layout");
            return Ok(Self::builtin());
        }
        let template = fs::read_to_string(&path).map_err(|source| RenderError::Template {
            path: path.clone(),
            source,
        })?;
        Ok(Self { template })
    }
}

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        consultant: &Consultant,
        client: &Client,
        invoice: &Invoice,
    ) -> Result<RenderedDocument, RenderError> {
        let values = placeholder_values(consultant, client, invoice)?;
        fill(&self.template, &values).map(RenderedDocument)
    }
}

fn placeholder_values(
    consultant: &Consultant,
    client: &Client,
    invoice: &Invoice,
) -> Result<BTreeMap<&'static str, String>, RenderError> {
    let escaped = [
        ("consultant.name", &consultant.name),
        ("consultant.address", &consultant.address),
        ("consultant.city_postal_code", &consultant.city_postal_code),
        ("consultant.country", &consultant.country),
        ("consultant.phone_number", &consultant.phone_number),
        ("consultant.email", &consultant.email),
        ("consultant.siret_number", &consultant.siret_number),
        ("consultant.ape_code", &consultant.ape_code),
        ("consultant.vat_number", &consultant.vat_number),
        ("consultant.bank_name", &consultant.bank_name),
        ("consultant.bank_account_number", &consultant.bank_account_number),
        ("consultant.bank_routing_number", &consultant.bank_routing_number),
        ("client.full_name", &client.full_name),
        ("client.short_name", &client.short_name),
        ("client.alias", &client.alias),
        ("client.address", &client.address),
        ("client.city_state_zip_code", &client.city_state_zip_code),
        ("client.country", &client.country),
    ];

    let mut values: BTreeMap<&'static str, String> = escaped
        .into_iter()
        .map(|(key, value)| (key, escape_html(value)))
        .collect();

    values.insert("invoice.number", escape_html(&invoice.number.to_string()));
    values.insert("invoice.date", invoice.date.format("%Y-%m-%d").to_string());
    values.insert("invoice.total", escape_html(&format_amount(invoice.total()?, None)));

    let rows = invoice
        .services
        .iter()
        .map(|line| {
            Ok(format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&line.name),
                line.units,
                escape_html(&format_amount(line.rate, None)),
                escape_html(&format_amount(line.total()?, None)),
            ))
        })
        .collect::<Result<String, DomainError>>()?;
    values.insert("services", rows);

    Ok(values)
}

fn fill(template: &str, values: &BTreeMap<&'static str, String>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or(RenderError::UnterminatedPlaceholder)?;
        let key = after[..close].trim();
        let value = values
            .get(key)
            .ok_or_else(|| RenderError::UnknownPlaceholder(key.to_string()))?;
        out.push_str(value);
        rest = &after[close + 2..];
    }
    out.push_str(rest);

    Ok(out)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const BUILTIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Invoice {{ invoice.number }}</title>
<style>
body { font-family: sans-serif; font-size: 12px; margin: 40px; }
table.lines { width: 100%; border-collapse: collapse; margin-top: 24px; }
table.lines th, table.lines td { border-bottom: 1px solid #ccc; padding: 6px; text-align: left; }
.total { text-align: right; font-weight: bold; margin-top: 16px; }
.parties { display: flex; justify-content: space-between; }
</style>
</head>
<body>
<h1>Invoice {{ invoice.number }}</h1>
<p>Date: {{ invoice.date }}</p>
<div class="parties">
<div>
<strong>{{ consultant.name }}</strong><br>
{{ consultant.address }}<br>
{{ consultant.city_postal_code }}<br>
{{ consultant.country }}<br>
{{ consultant.phone_number }}<br>
{{ consultant.email }}<br>
SIRET: {{ consultant.siret_number }} / APE: {{ consultant.ape_code }}<br>
VAT: {{ consultant.vat_number }}
</div>
<div>
<strong>{{ client.full_name }}</strong><br>
{{ client.address }}<br>
{{ client.city_state_zip_code }}<br>
{{ client.country }}
</div>
</div>
<table class="lines">
<thead><tr><th>Service</th><th>Units</th><th>Rate</th><th>Amount</th></tr></thead>
<tbody>
{{ services }}</tbody>
</table>
<p class="total">Total: {{ invoice.total }}</p>
<p>
Bank: {{ consultant.bank_name }}<br>
Account: {{ consultant.bank_account_number }}<br>
Routing: {{ consultant.bank_routing_number }}
</p>
</body>
</html>
"#;
