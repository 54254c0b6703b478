use anyhow::{Context, Result};
use opentelemetry::sdk::trace::Tracer;
use opentelemetry_otlp::WithExportConfig;
use tonic::metadata::{Ascii, MetadataValue};

use crate::configuration::HoneycombConfiguration;

pub fn get_honeycomb_tracer(config: &HoneycombConfiguration) -> Result<Tracer> {
    let mut map = tonic::metadata::MetadataMap::with_capacity(2);

    map.insert(
        "x-honeycomb-team",
        config
            .api_key
            .parse::<MetadataValue<Ascii>>()
            .context("HONEYCOMB_API_KEY is not a valid header value.")?,
    );
    map.insert(
        "x-honeycomb-dataset",
        config
            .dataset
            .parse::<MetadataValue<Ascii>>()
            .context("HONEYCOMB_DATASET is not a valid header value.")?,
    );
    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint("https://api.honeycomb.io")
        .with_metadata(map);
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .install_simple()
        .context("Failed to install the honeycomb exporter.")?;
    Ok(tracer)
}
