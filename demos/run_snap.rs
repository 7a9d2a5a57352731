//! Runs a SNAP graph on a Sentinel-1 product and downloads the outputs

use eocanvas_rust_sdk::logging::setup_logger;
use eocanvas_rust_sdk::prelude::*;
use std::error::Error;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logger(log::LevelFilter::Info);

    let graph_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "graph.xml".to_string());

    let api = Api::from_env()?;
    let graph = Graph::from_file(&graph_path)?;

    let inputs = SnapInputs::new(graph)
        .with_input(Input::new(
            "img1",
            "https://catalogue.dataspace.copernicus.eu/odata/v1/Products(fcb3f4b3-5bb6-4d33-a6d6-2a1bc5d9a0e8)",
        ))
        .with_config(Config::new("img1", ConfigOption::new("S1A_IW_GRDH.SAFE").uncompress(true)));

    let process = Process::snap(inputs);
    println!("Submitting {}", process.process_id);

    let report = process.run(&api, None, Some(Path::new("outputs"))).await?;
    println!("Polled {} times", report.polls);
    for path in &report.downloaded {
        println!("   downloaded {}", path.display());
    }
    for title in &report.skipped {
        println!("   external result {}", title);
    }

    Ok(())
}
