use futures::future::join_all;
use serde::Serialize;

use crate::cli::{utils, OutputFormat};
use crate::config::config;
use crate::database::{open_stores, DataStore};
use crate::filter::FilterData;
use crate::services::{classify::classify, fetch_list};
use crate::types::Resource;

#[derive(Debug, Serialize)]
pub struct ResourceStatus {
    pub resource: String,
    pub source: &'static str,
    pub rows: usize,
    pub problem: Option<String>,
    pub hint: Option<String>,
}

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    // what the admin area sees
    let store = open_stores(&config().store)?.admin;
    let reachable = store.ping().await;
    let statuses = probe_all(store.as_ref()).await;

    match output_format {
        OutputFormat::Json => utils::print_json(&serde_json::json!({
            "backend": store.backend(),
            "reachable": reachable.is_ok(),
            "ping_error": reachable.err().map(|e| e.to_string()),
            "resources": statuses,
        })),
        OutputFormat::Text => {
            match &reachable {
                Ok(()) => println!("backend: {} (reachable)", store.backend()),
                Err(e) => println!("backend: {} (unreachable: {})", store.backend(), e),
            }
            let rows: Vec<Vec<String>> = statuses
                .iter()
                .map(|s| {
                    vec![
                        s.resource.clone(),
                        s.source.to_string(),
                        s.rows.to_string(),
                        s.problem.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            println!("{}", utils::format_table(&["resource", "source", "rows", "problem"], &rows));
            for hint in statuses.iter().filter_map(|s| s.hint.as_deref()) {
                println!("hint: {}", hint);
            }
            Ok(())
        }
    }
}

/// Probe every resource concurrently
pub async fn probe_all(store: &dyn DataStore) -> Vec<ResourceStatus> {
    join_all(Resource::ALL.iter().map(|r| probe(store, *r))).await
}

async fn probe(store: &dyn DataStore, resource: Resource) -> ResourceStatus {
    let listing = fetch_list(store, resource).await;

    // the listing hides store failures; ask once more to explain them
    let (problem, hint) = if listing.used_fallback {
        let limit = FilterData { limit: Some(1), ..Default::default() };
        match store.select(resource.table(), Some(&limit)).await {
            Ok(rows) if rows.is_empty() => (Some("table is empty".to_string()), None),
            Ok(_) => (Some("rows could not be decoded".to_string()), None),
            Err(e) if e.is_unconfigured() => (Some(e.to_string()), None),
            Err(e) => {
                let classified = classify(resource.table(), e);
                (Some(classified.to_string()), classified.remediation())
            }
        }
    } else {
        (None, None)
    };

    ResourceStatus {
        resource: resource.table().to_string(),
        source: if listing.used_fallback { "fallback" } else { "live" },
        rows: listing.records.len(),
        problem,
        hint,
    }
}
