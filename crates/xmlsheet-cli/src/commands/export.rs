//! Export command - write the edited catalog as XML or CSV.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use indexmap::IndexMap;
use xmlsheet::view::SortConfig;
use xmlsheet::{SortDirection, TableView};

use super::open_catalog;
use crate::cli::ExportFormat;

/// View options collected from the command line.
#[derive(Debug, Default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
    pub hide: Vec<String>,
    pub filter: Vec<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub deactivate: Vec<String>,
    pub group_sort: bool,
}

impl ExportOptions {
    fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Apply the options to a table view.
    pub fn apply_to(&self, view: &mut TableView) -> Result<(), Box<dyn std::error::Error>> {
        for name in &self.hide {
            view.set_visible(name.trim(), false);
        }

        for (field, values) in parse_filters(&self.filter)? {
            view.set_filter(&field, values);
        }

        if let Some(field) = &self.sort {
            view.set_sort(SortConfig {
                field: field.clone(),
                direction: self.direction(),
            })?;
        }

        if self.group_sort {
            view.set_group_sort(true, self.direction());
        }

        view.deactivate(&self.deactivate);
        Ok(())
    }
}

/// Group `FIELD=VALUE` arguments by field.
fn parse_filters(
    filters: &[String],
) -> Result<IndexMap<String, Vec<String>>, Box<dyn std::error::Error>> {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for filter in filters {
        let (field, value) = filter
            .split_once('=')
            .ok_or_else(|| format!("Invalid filter '{}': expected FIELD=VALUE", filter))?;
        grouped
            .entry(field.trim().to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(grouped)
}

pub fn run(
    store: &Path,
    source: &str,
    options: ExportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = open_catalog(store, source)?;
    options.apply_to(catalog.view_mut())?;

    let content = match options.format {
        ExportFormat::Xml => catalog.export_xml()?,
        ExportFormat::Csv => catalog.export_csv()?,
    };

    match &options.output {
        Some(path) => {
            fs::write(path, &content)?;
            eprintln!(
                "{} {} records to {} ({})",
                "Exported".green().bold(),
                catalog.visible_records().len(),
                path.display().to_string().white(),
                options.format
            );
        }
        None => print!("{}", content),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlsheet::Catalog;

    const ANIMALS: &str = "<CATALOG>\
        <ANIMAL><NAME>Lion</NAME><HABITAT>Savanna</HABITAT></ANIMAL>\
        <ANIMAL><NAME>Owl</NAME><HABITAT>Forest</HABITAT></ANIMAL>\
        <ANIMAL><NAME>Bat</NAME><HABITAT>Cave</HABITAT></ANIMAL>\
        </CATALOG>";

    #[test]
    fn test_parse_filters_groups_by_field() {
        let filters = vec![
            "slot_2=Forest".to_string(),
            "slot_2=Cave".to_string(),
            "notes=a=b".to_string(),
        ];
        let grouped = parse_filters(&filters).unwrap();
        assert_eq!(grouped["slot_2"], vec!["Forest", "Cave"]);
        assert_eq!(grouped["notes"], vec!["a=b"]);
    }

    #[test]
    fn test_parse_filters_rejects_missing_value() {
        assert!(parse_filters(&["slot_1".to_string()]).is_err());
    }

    #[test]
    fn test_options_shape_the_export() {
        let mut catalog = Catalog::in_memory();
        catalog.load_xml(ANIMALS).unwrap();

        let options = ExportOptions {
            format: ExportFormat::Csv,
            hide: vec!["slot_2".to_string()],
            filter: vec!["slot_2=Forest".to_string(), "slot_2=Cave".to_string()],
            sort: Some("slot_1".to_string()),
            ..Default::default()
        };
        options.apply_to(catalog.view_mut()).unwrap();

        assert_eq!(
            catalog.export_csv().unwrap(),
            "\"ID\",\"NAME\"\n\"3\",\"Bat\"\n\"2\",\"Owl\"\n"
        );
    }

    #[test]
    fn test_unsortable_field_is_rejected() {
        let mut catalog = Catalog::in_memory();
        catalog.load_xml(ANIMALS).unwrap();

        let options = ExportOptions {
            sort: Some("notes".to_string()),
            ..Default::default()
        };
        assert!(options.apply_to(catalog.view_mut()).is_err());
    }
}
