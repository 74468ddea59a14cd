//! Entity table parser
//!
//! Content pages describe each entity in a `<table id="...">` laid out as
//! label/value cells (`Nome:` | `Pikachu`). This module turns every such
//! table into a [`Record`], skipping the ones that cannot yield a valid
//! record without affecting their siblings.

use crate::record::{Record, RecordBuilder, ValidationError};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Cell labels used by the site
pub mod labels {
    pub const NUMBER: &str = "Nº";
    pub const NAME: &str = "Nome";
    pub const TYPE: &str = "Tipo";
    pub const SHINY: &str = "Coloração Shiny";
}

/// Why a candidate table produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No image, number or name cell anywhere in the table
    NoHeader,
    /// Header found but no number cell
    MissingIdentifier,
    /// Header found but no `Nome:` cell
    MissingName,
    /// Cells were present but the builder rejected their contents
    Invalid(ValidationError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHeader => write!(f, "no identifying header cell"),
            Self::MissingIdentifier => write!(f, "no {} cell", labels::NUMBER),
            Self::MissingName => write!(f, "no {} cell", labels::NAME),
            Self::Invalid(e) => write!(f, "{}", e),
        }
    }
}

/// A table that was skipped, with enough context to find it again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSkip {
    /// Position among the candidate tables of the page
    pub index: usize,
    /// The table's `id` attribute
    pub table_id: Option<String>,
    pub reason: SkipReason,
}

/// Outcome of parsing one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Records in table order
    pub records: Vec<Record>,
    pub skipped: Vec<TableSkip>,
}

/// Fields gathered from one table before validation
#[derive(Debug, Default)]
struct TableFields {
    image_url: Option<String>,
    identifier: Option<String>,
    attributes: BTreeMap<String, String>,
}

struct Selectors {
    table: Selector,
    row: Selector,
    image: Selector,
}

impl Selectors {
    fn new() -> Option<Self> {
        Some(Self {
            table: Selector::parse("table[id]").ok()?,
            row: Selector::parse("tr").ok()?,
            image: Selector::parse("img[src]").ok()?,
        })
    }
}

/// Parses entity tables into records
#[derive(Debug, Clone, Copy, Default)]
pub struct TableParser;

impl TableParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a page and returns only the valid records
    ///
    /// # Example
    ///
    /// ```
    /// use pokedex_harvest::crawler::TableParser;
    /// use url::Url;
    ///
    /// let html = r#"<table id="p1">
    ///     <tr><td><img src="/img/001.gif"></td><td>Nº:</td><td>001</td></tr>
    ///     <tr><td>Nome:</td><td>Bulbasaur</td></tr>
    ///     <tr><td>Tipo:</td><td>Planta/Veneno</td></tr>
    /// </table>"#;
    /// let page = Url::parse("https://example.com/conteudo/pokemon/lista01.htm").unwrap();
    ///
    /// let records = TableParser::new().parse(html, &page);
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].name(), "Bulbasaur");
    /// assert_eq!(records[0].categories(), ["Planta", "Veneno"]);
    /// ```
    pub fn parse(&self, page_html: &str, page_url: &Url) -> Vec<Record> {
        self.parse_page(page_html, page_url).records
    }

    /// Parses a page, keeping track of every skipped table
    ///
    /// Candidate tables are the `<table>` elements carrying an `id`. Each one
    /// goes through the same ordered extraction:
    ///
    /// 1. Main image: first `<img src>` in the first cell of a row
    /// 2. Identifier: `Nº:` in the second cell (value in the third), or `Nº`
    ///    in the first cell (value in the second)
    /// 3. Shiny image: from a row mentioning "Coloração Shiny" (or the row
    ///    after it), or from the `Nome:` row
    /// 4. Label/value pairs: every even cell ending with `:` labels the next
    ///    cell
    ///
    /// The `Nome` and `Tipo` pairs become the name and categories, every
    /// other pair an extra attribute.
    pub fn parse_page(&self, page_html: &str, page_url: &Url) -> ParsedPage {
        let mut parsed = ParsedPage::default();

        let Some(selectors) = Selectors::new() else {
            return parsed;
        };

        let document = Html::parse_document(page_html);

        for (index, table) in document.select(&selectors.table).enumerate() {
            let table_id = table.value().attr("id").map(str::to_string);

            match parse_table(table, &selectors, page_url) {
                Ok(record) => parsed.records.push(record),
                Err(reason) => {
                    match reason {
                        SkipReason::Invalid(e) => tracing::warn!(
                            page = %page_url,
                            table = table_id.as_deref().unwrap_or(""),
                            reason = %e,
                            "Record rejected"
                        ),
                        _ => tracing::warn!(
                            page = %page_url,
                            table = table_id.as_deref().unwrap_or(""),
                            reason = %reason,
                            "Skipping table"
                        ),
                    }
                    parsed.skipped.push(TableSkip {
                        index,
                        table_id,
                        reason,
                    });
                }
            }
        }

        tracing::debug!(
            page = %page_url,
            records = parsed.records.len(),
            skipped = parsed.skipped.len(),
            "Parsed page"
        );

        parsed
    }
}

fn parse_table(
    table: ElementRef<'_>,
    selectors: &Selectors,
    page_url: &Url,
) -> Result<Record, SkipReason> {
    let rows: Vec<ElementRef<'_>> = table.select(&selectors.row).collect();
    let mut fields = TableFields::default();

    for (pos, row) in rows.iter().enumerate() {
        let cells = row_cells(*row);
        if cells.is_empty() {
            continue;
        }

        extract_main_image(&cells, selectors, page_url, &mut fields);
        extract_identifier(&cells, &mut fields);
        extract_shiny_image(*row, &cells, rows.get(pos + 1), selectors, page_url, &mut fields);
        extract_label_value_pairs(&cells, &mut fields);
    }

    build_record(fields)
}

fn build_record(mut fields: TableFields) -> Result<Record, SkipReason> {
    let pair_identifier = fields.attributes.remove(labels::NUMBER);
    let identifier = fields.identifier.take().or(pair_identifier);
    let name = fields.attributes.remove(labels::NAME);
    let types = fields.attributes.remove(labels::TYPE);

    if fields.image_url.is_none() && identifier.is_none() && name.is_none() {
        return Err(SkipReason::NoHeader);
    }

    let Some(identifier) = identifier else {
        return Err(SkipReason::MissingIdentifier);
    };

    let Some(name) = name else {
        return Err(SkipReason::MissingName);
    };

    let mut builder = RecordBuilder::new().identifier(identifier).name(name);

    // The builder splits "Planta/Veneno" into one category per type
    if let Some(types) = types {
        builder = builder.category(types);
    }

    if let Some(image_url) = fields.image_url {
        builder = builder.image_url(image_url);
    }

    for (key, value) in fields.attributes {
        builder = builder.attribute(key, value);
    }

    builder.build().map_err(SkipReason::Invalid)
}

fn extract_main_image(
    cells: &[ElementRef<'_>],
    selectors: &Selectors,
    page_url: &Url,
    fields: &mut TableFields,
) {
    if fields.image_url.is_some() {
        return;
    }

    if let Some(first) = cells.first() {
        fields.image_url = first_image(*first, selectors, page_url);
    }
}

fn extract_identifier(cells: &[ElementRef<'_>], fields: &mut TableFields) {
    let number_label = format!("{}:", labels::NUMBER);

    match cells {
        [_, label, value, ..] if compact_text(*label) == number_label => {
            fields.identifier = Some(compact_text(*value));
        }
        [label, value, ..] if compact_text(*label).contains(labels::NUMBER) => {
            fields.identifier = Some(compact_text(*value));
        }
        _ => {}
    }
}

fn extract_shiny_image(
    row: ElementRef<'_>,
    cells: &[ElementRef<'_>],
    next_row: Option<&ElementRef<'_>>,
    selectors: &Selectors,
    page_url: &Url,
    fields: &mut TableFields,
) {
    let line = spaced_text(row).to_lowercase();
    let shiny_marker = labels::SHINY.to_lowercase();

    let image = if line.contains(&shiny_marker) {
        first_image(row, selectors, page_url)
            .or_else(|| next_row.and_then(|next| first_image(*next, selectors, page_url)))
    } else if cells.len() >= 2 && compact_text(cells[0]).contains(&format!("{}:", labels::NAME)) {
        first_image(row, selectors, page_url)
    } else {
        None
    };

    if let Some(image) = image {
        fields.attributes.insert(labels::SHINY.to_string(), image);
    }
}

fn extract_label_value_pairs(cells: &[ElementRef<'_>], fields: &mut TableFields) {
    for pair in cells.chunks_exact(2) {
        let label = compact_text(pair[0]);
        if !label.ends_with(':') {
            continue;
        }

        let key = normalize_key(&label);
        if key.is_empty() {
            continue;
        }

        let value = spaced_text(pair[1]);

        // An empty cell never erases a value captured earlier (e.g. the
        // shiny image under a bare "Coloração Shiny:" label).
        if value.is_empty() && fields.attributes.contains_key(&key) {
            continue;
        }

        fields.attributes.insert(key, value);
    }
}

/// Direct `<td>` children of a row
fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .collect()
}

fn first_image(element: ElementRef<'_>, selectors: &Selectors, page_url: &Url) -> Option<String> {
    let src = element.select(&selectors.image).next()?.value().attr("src")?.trim();
    if src.is_empty() {
        return None;
    }

    page_url.join(src).ok().map(|url| url.to_string())
}

/// Text nodes trimmed and concatenated, the way labels are compared
fn compact_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Text with every whitespace run collapsed to a single space
fn spaced_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_key(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/conteudo/pokemon/lista01.htm").unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        TableParser::new().parse_page(html, &page_url())
    }

    const PIKACHU: &str = r#"
        <table id="p025">
          <tr>
            <td rowspan="4"><img src="/imagens/pokemon/025.gif"></td>
            <td><b>Nº:</b></td><td>025</td>
          </tr>
          <tr><td>Nome:</td><td>Pikachu</td></tr>
          <tr><td>Tipo:</td><td>Elétrico</td></tr>
          <tr><td>Altura:</td><td>0,4
              m</td><td>Peso:</td><td>6,0 kg</td></tr>
          <tr><td colspan="4">Coloração Shiny</td></tr>
          <tr><td><img src="shiny/025.gif"></td></tr>
        </table>
    "#;

    #[test]
    fn test_parse_complete_table() {
        let parsed = parse(PIKACHU);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.records.len(), 1);

        let record = &parsed.records[0];
        assert_eq!(record.identifier(), "025");
        assert_eq!(record.name(), "Pikachu");
        assert_eq!(record.categories(), ["Elétrico"]);
        assert_eq!(
            record.image_url(),
            Some("https://example.com/imagens/pokemon/025.gif")
        );
        assert_eq!(record.attribute("Altura"), Some("0,4 m"));
        assert_eq!(record.attribute("Peso"), Some("6,0 kg"));
        assert_eq!(
            record.attribute(labels::SHINY),
            Some("https://example.com/conteudo/pokemon/shiny/025.gif")
        );
        assert_eq!(record.attribute(labels::NAME), None);
        assert_eq!(record.attribute(labels::TYPE), None);
    }

    #[test]
    fn test_identifier_from_first_cell_label() {
        let html = r#"
            <table id="t1">
              <tr><td>Nº</td><td> 133 </td></tr>
              <tr><td>Nome:</td><td>Eevee</td></tr>
            </table>
        "#;

        let records = parse(html).records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier(), "133");
        assert!(records[0].extra_attributes().is_empty());
    }

    #[test]
    fn test_multiple_types_keep_order() {
        let html = r#"
            <table id="t6">
              <tr><td><img src="/i/006.gif"></td><td>Nº:</td><td>006</td></tr>
              <tr><td>Nome:</td><td>Charizard</td></tr>
              <tr><td>Tipo:</td><td>Fogo / Voador</td></tr>
            </table>
        "#;

        let records = parse(html).records;
        assert_eq!(records[0].categories(), ["Fogo", "Voador"]);
    }

    #[test]
    fn test_missing_name_table_skipped_sibling_kept() {
        let html = format!(
            r#"{}
            <table id="p026">
              <tr><td><img src="/imagens/pokemon/026.gif"></td><td>Nº:</td><td>026</td></tr>
              <tr><td>Tipo:</td><td>Elétrico</td></tr>
            </table>"#,
            PIKACHU
        );

        let parsed = parse(&html);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].name(), "Pikachu");
        assert_eq!(
            parsed.skipped,
            vec![TableSkip {
                index: 1,
                table_id: Some("p026".to_string()),
                reason: SkipReason::MissingName,
            }]
        );
    }

    #[test]
    fn test_malformed_tables_never_discard_valid_ones() {
        let html = format!(
            r#"
            <table id="no-id">
              <tr><td>Nome:</td><td>Missingno</td></tr>
            </table>
            <table id="layout"><tr><td>Menu</td><td>Links</td></tr></table>
            {}
            <table id="nothing"></table>
            <table id="blank-name">
              <tr><td>Nº</td><td>150</td></tr>
              <tr><td>Nome:</td><td>   </td></tr>
            </table>
            "#,
            PIKACHU
        );

        let parsed = parse(&html);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].identifier(), "025");

        let reasons: Vec<_> = parsed.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingIdentifier,
                SkipReason::NoHeader,
                SkipReason::NoHeader,
                SkipReason::Invalid(ValidationError::MissingName),
            ]
        );
    }

    #[test]
    fn test_tables_without_id_are_not_candidates() {
        let html = r#"
            <table>
              <tr><td>Nº</td><td>001</td></tr>
              <tr><td>Nome:</td><td>Bulbasaur</td></tr>
            </table>
        "#;

        let parsed = parse(html);
        assert!(parsed.records.is_empty());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_listing_page_keeps_table_order() {
        let html = r#"
            <table id="a"><tr><td>Nº</td><td>002</td></tr><tr><td>Nome:</td><td>Ivysaur</td></tr></table>
            <table id="b"><tr><td>Nº</td><td>001</td></tr><tr><td>Nome:</td><td>Bulbasaur</td></tr></table>
            <table id="c"><tr><td>Nº</td><td>003</td></tr><tr><td>Nome:</td><td>Venusaur</td></tr></table>
        "#;

        let ids: Vec<_> = parse(html)
            .records
            .iter()
            .map(|r| r.identifier().to_string())
            .collect();
        assert_eq!(ids, vec!["002", "001", "003"]);
    }

    #[test]
    fn test_duplicate_label_last_write_wins() {
        let html = r#"
            <table id="t">
              <tr><td>Nº</td><td>007</td></tr>
              <tr><td>Nome:</td><td>Squirtle</td></tr>
              <tr><td>Habilidade:</td><td>Torrent</td></tr>
              <tr><td> Habilidade : </td><td>Rain  Dish</td></tr>
            </table>
        "#;

        let records = parse(html).records;
        assert_eq!(records[0].attribute("Habilidade"), Some("Rain Dish"));
    }

    #[test]
    fn test_shiny_image_from_name_row() {
        let html = r#"
            <table id="t">
              <tr><td>Nº</td><td>004</td></tr>
              <tr><td>Nome:</td><td>Charmander</td><td><img src="/s/004.gif"></td></tr>
            </table>
        "#;

        let records = parse(html).records;
        assert_eq!(
            records[0].attribute(labels::SHINY),
            Some("https://example.com/s/004.gif")
        );
        assert_eq!(records[0].image_url(), None);
    }

    #[test]
    fn test_image_without_src_is_ignored() {
        let html = r#"
            <table id="t">
              <tr><td><img alt="sem imagem"></td><td>Nº:</td><td>010</td></tr>
              <tr><td>Nome:</td><td>Caterpie</td></tr>
            </table>
        "#;

        let records = parse(html).records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_url(), None);
    }

    #[test]
    fn test_broken_markup_does_not_panic() {
        let html = r#"<table id="x"><tr><td>Nº<td>011<tr><td>Nome:<td>Metapod</table><table id="y"><tr><td"#;
        let parsed = parse(html);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].name(), "Metapod");
    }

    #[test]
    fn test_empty_page() {
        let parsed = parse("");
        assert!(parsed.records.is_empty());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::MissingName.to_string(), "no Nome cell");
        assert_eq!(
            SkipReason::Invalid(ValidationError::MissingIdentifier).to_string(),
            "record has no identifier"
        );
    }
}
