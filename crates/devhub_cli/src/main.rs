//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `devhub_core` linkage and configuration wiring.
//! - Print a one-line summary per project from the configured snapshot.
//!
//! Usage: `devhub [DATA_PATH]`. The optional path overrides `DEVHUB_DATA_PATH`.

use devhub_core::tree::mutate::{count_completed, count_tasks};
use devhub_core::{open_store, CoreConfig, Project};
use std::path::PathBuf;

fn main() {
    println!("devhub_core ping={}", devhub_core::ping());
    println!("devhub_core version={}", devhub_core::core_version());

    if let Err(message) = run() {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(path) = std::env::args().nth(1) {
        config.data_path = PathBuf::from(path);
    }
    config.init_logging()?;

    let store = open_store(&config).map_err(|err| err.to_string())?;
    println!(
        "store backend={:?} path={} projects={}",
        config.backend,
        config.data_path.display(),
        store.projects().len()
    );
    let selected = store.default_selection();
    for project in store.projects() {
        println!("{}", summary_line(project, selected == Some(project.id)));
    }
    Ok(())
}

fn summary_line(project: &Project, selected: bool) -> String {
    let mut markers = Vec::new();
    if selected {
        markers.push("selected");
    }
    if project.is_default {
        markers.push("default");
    }
    if project.is_deleted {
        markers.push("trash");
    }
    let markers = if markers.is_empty() {
        String::new()
    } else {
        format!(" [{}]", markers.join(","))
    };
    format!(
        "- {} {}/{} done{}",
        project.name,
        count_completed(&project.tasks),
        count_tasks(&project.tasks),
        markers
    )
}
