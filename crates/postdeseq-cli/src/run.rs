//! Batch driver: resolve the annotation, read every result table, run the
//! pipeline and write all outputs.

use anyhow::Context;
use tracing::{info, warn};

use postdeseq_annotate::{Pipeline, PipelineConfig, RunSummary};
use postdeseq_common::AnnotationTable;
use postdeseq_config::{AnnotationSource, Config};
use postdeseq_io::{emit, read_annotation_table, read_result_dir, AnnotationCatalog, DirectorySink, EmitOptions};

/// Read the annotation table named by `source`.
pub fn load_annotations(source: &AnnotationSource) -> anyhow::Result<AnnotationTable> {
    let path = match source {
        AnnotationSource::File(path) => path.clone(),
        AnnotationSource::Catalog { catalog, dir, code } => {
            let catalog = AnnotationCatalog::load(catalog)
                .with_context(|| format!("Failed to load annotation catalog {}", catalog.display()))?;
            catalog.path_for(code, dir)?
        }
    };
    read_annotation_table(&path)
        .with_context(|| format!("Failed to read annotation table {}", path.display()))
}

/// Run the whole batch described by `config`.
///
/// Tables whose annotation schema does not fit are reported in the summary
/// and produce no output files; the other tables are unaffected.
pub fn execute(config: &Config) -> anyhow::Result<RunSummary> {
    let source = config.annotation.source()?;
    let mode = config.annotation.mode;
    info!(mode = %mode, annotation = %source, "Resolving annotation");
    let annotations = load_annotations(&source)?;

    let tables = read_result_dir(&config.input.dir)
        .with_context(|| format!("Failed to read result tables from {}", config.input.dir.display()))?;
    if tables.is_empty() {
        warn!(dir = %config.input.dir.display(), "No result tables found");
    }

    let pipeline = Pipeline::new(
        PipelineConfig { mode, parallel: config.execution.parallel },
        &annotations,
    );
    let outcomes = pipeline.run_batch(&tables);

    let mut sink = DirectorySink::new(&config.output.dir);
    let opts = EmitOptions { flagged: config.output.write_flagged };
    for output in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        emit(output, &mut sink, opts)
            .with_context(|| format!("Failed to write outputs for {}", output.table))?;
    }

    let summary = RunSummary::from_outcomes(mode, &outcomes).with_source(source.to_string());
    if config.output.write_summary {
        sink.write_summary(&summary)?;
    }

    info!(
        run_id = %summary.run_id,
        tables = summary.tables.len(),
        failed = summary.failed(),
        files_written = sink.written(),
        "Run complete"
    );
    Ok(summary)
}
