#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.input.dir, PathBuf::from("input"));
        assert_eq!(config.annotation.mode, IdMode::GeneId);
        assert!(config.output.write_flagged);
        assert!(config.execution.parallel);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
            [input]
            dir = "deseq"

            [annotation]
            mode = "locus"
            catalog = "lab/catalog.tsv"
            dir = "lab"
            type = "SL"

            [output]
            dir = "out"
            write_flagged = false

            [execution]
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(config.input.dir, PathBuf::from("deseq"));
        assert_eq!(config.annotation.mode, IdMode::Locus);
        assert!(!config.output.write_flagged);
        assert!(config.output.write_summary);
        assert!(!config.execution.parallel);
        assert_eq!(
            config.annotation.source().unwrap(),
            AnnotationSource::Catalog {
                catalog: PathBuf::from("lab/catalog.tsv"),
                dir: PathBuf::from("lab"),
                code: "SL".to_string(),
            }
        );
    }

    #[test]
    fn test_legacy_species_codes_select_mode() {
        let a = Config::from_toml("[annotation]\nmode = \"A\"\n").unwrap();
        let s = Config::from_toml("[annotation]\nmode = \"S\"\n").unwrap();
        assert_eq!(a.annotation.mode, IdMode::GeneId);
        assert_eq!(s.annotation.mode, IdMode::Locus);

        let lower = Config::from_toml("[annotation]\nmode = \"a\"\n").unwrap();
        let upper = Config::from_toml("[annotation]\nmode = \"LOCUS\"\n").unwrap();
        assert_eq!(lower.annotation.mode, IdMode::GeneId);
        assert_eq!(upper.annotation.mode, IdMode::Locus);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Config::from_toml("[annotation]\nmode = \"transcript\"\n").unwrap_err();
        assert!(matches!(err, PostDeseqError::Config(_)));
    }

    #[test]
    fn test_direct_file_wins_over_catalog() {
        let annotation = AnnotationConfig {
            type_code: Some("AT".to_string()),
            file: Some(PathBuf::from("custom.tsv")),
            ..Default::default()
        };
        assert_eq!(annotation.source().unwrap(), AnnotationSource::File(PathBuf::from("custom.tsv")));
    }

    #[test]
    fn test_no_annotation_source_is_an_error() {
        let blank = AnnotationConfig {
            type_code: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(AnnotationConfig::default().source().is_err());
        assert!(blank.source().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postdeseq.toml");
        std::fs::write(&path, "[annotation]\nfile = \"ann.csv\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.annotation.file, Some(PathBuf::from("ann.csv")));
    }
}
