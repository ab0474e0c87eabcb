use crate::cli::{utils, OutputFormat};
use crate::database::models::Record;
use crate::fallback;
use crate::types::Resource;

pub async fn handle(resource: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let resource: Resource = resource.parse().map_err(anyhow::Error::msg)?;
    let records = fallback::records(resource);

    match output_format {
        OutputFormat::Json => utils::print_json(&records),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = records.iter().map(|r| vec![r.id().to_string(), label(r)]).collect();
            println!("{}", utils::format_table(&["id", resource.table()], &rows));
            Ok(())
        }
    }
}

fn label(record: &Record) -> String {
    match record {
        Record::Company(c) => c.name.clone(),
        Record::Course(c) => format!("{} ({}, {:.2})", c.title, c.duration, c.price),
        Record::Project(p) => format!("{} [{}]", p.title, p.technologies.join(", ")),
        Record::Inquiry(i) => format!("{} <{}>: {}", i.name, i.email, i.subject),
    }
}
