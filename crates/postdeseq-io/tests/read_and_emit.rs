use pretty_assertions::assert_eq;

use postdeseq_annotate::{Pipeline, PipelineConfig};
use postdeseq_common::IdMode;
use postdeseq_io::{
    emit, read_annotation_table, read_result_dir, AnnotationCatalog, DirectorySink, EmitOptions,
    MemorySink,
};
use postdeseq_test_utils::{scratch_workspace, write_file};

#[test]
fn test_catalog_resolves_and_tables_round_through_sink() {
    let ws = scratch_workspace().unwrap();
    let root = ws.path();

    let catalog = AnnotationCatalog::load(&root.join("annotations.tsv")).unwrap();
    let annotation_path = catalog.path_for("at", &root.join("annotations")).unwrap();
    let annotations = read_annotation_table(&annotation_path).unwrap();
    let tables = read_result_dir(&root.join("input")).unwrap();
    assert_eq!(tables.len(), 1);

    let pipeline = Pipeline::new(PipelineConfig::new(IdMode::Locus), &annotations);
    let outcomes = pipeline.run_batch(&tables);
    let output = outcomes[0].result.as_ref().unwrap();

    let mut memory = MemorySink::default();
    let mut disk = DirectorySink::new(root.join("out"));
    let n = emit(output, &mut memory, EmitOptions::default()).unwrap();
    assert_eq!(emit(output, &mut disk, EmitOptions::default()).unwrap(), n);

    // Disk content matches the in-memory rendering, NaN written as empty.
    for table in &memory.tables {
        let text = std::fs::read_to_string(root.join("out").join(&table.name)).unwrap();
        let disk_rows: Vec<Vec<String>> = text
            .lines()
            .skip(1)
            .map(|l| l.split('\t').map(str::to_string).collect())
            .collect();
        assert_eq!(disk_rows, table.rows, "{}", table.name.display());
    }

    let annotated = memory.get("annotated/annotated_WT_vs_KO.txt").unwrap();
    let padj = annotated.column("P-adj").unwrap();
    assert_eq!(padj, vec!["0.002", "0.008", "", "0.045"]);
}

#[test]
fn test_csv_annotation_in_gene_id_mode() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "in/a.txt", "gene:AT1G01010 10 1.2 0.1 4 0.001 0.004\n").unwrap();
    let path = write_file(dir.path(), "ann.csv", "GeneID,Symbol,Note\nAT1G01010,NAC001,\"NAC, domain\"\n").unwrap();

    let annotations = read_annotation_table(&path).unwrap();
    let tables = read_result_dir(&dir.path().join("in")).unwrap();
    let pipeline = Pipeline::new(PipelineConfig::new(IdMode::GeneId).sequential(), &annotations);
    let output = pipeline.run_table(&tables[0]).unwrap();

    let mut sink = MemorySink::default();
    emit(&output, &mut sink, EmitOptions { flagged: true }).unwrap();
    let annotated = sink.get("annotated/annotated_a.txt").unwrap();
    assert_eq!(annotated.column("JoinKey").unwrap(), vec!["AT1G01010"]);
    assert_eq!(annotated.column("Note").unwrap(), vec!["NAC, domain"]);

    let flagged = sink.get("annotated/a.txt").unwrap();
    assert_eq!(flagged.column("loc").unwrap(), vec!["AT1G01010"]);
    assert_eq!(flagged.column("Last").unwrap(), vec!["AT1G01010"]);
}
