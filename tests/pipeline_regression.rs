//! Pipeline Regression Tests
//!
//! Drives ingestion, catalog and interpretation against the durable sled
//! store and local file archive in a temporary data directory.

use onegeo::config::{AppConfig, ArchiveBackend};
use onegeo::interpretation::InterpretError;
use onegeo::services::Services;
use onegeo::IngestOutcome;
use tempfile::TempDir;

/// Descending index, as many logging tools write it.
const BRAVO_LAS: &str = "~VERSION INFORMATION
 VERS.                 2.0 :   CWLS LOG ASCII STANDARD -VERSION 2.0
 WRAP.                  NO :   ONE LINE PER DEPTH STEP
~WELL INFORMATION
#MNEM.UNIT       DATA                       DESCRIPTION
 STRT.FT        2000.0000                  : START DEPTH
 STOP.FT        2003.0000                  : STOP DEPTH
 STEP.FT          -0.5000                  : STEP
 NULL.          -999.2500                  : NULL VALUE
 COMP.          ONEGEO TEST CO.            : COMPANY
 WELL.          BRAVO 12-34                : WELL
~CURVE INFORMATION
 DEPT.FT                   : 1  DEPTH
 ILD.OHMM                  : 2  DEEP RESISTIVITY
 DT.US/F                   : 3  SONIC TRANSIT TIME
~PARAMETER INFORMATION
 BHT .DEGC         35.5000 : BOTTOM HOLE TEMPERATURE
~A  DEPTH     ILD      DT
2003.000   25.000  110.000
2002.500   28.000  112.000
2002.000 -999.250  115.000
2001.500   30.000  118.000
2001.000   32.000  -999.25
";

/// Two curves per depth, split across lines.
const WRAPPED_LAS: &str = "~V
 VERS. 2.0 :
 WRAP. YES :
~W
 NULL. -999.25 :
 WELL. WRAPPED-1 :
~C
 DEPT.M :
 GR.GAPI :
 RT.OHMM :
~A
100.0
 40.0 3.0
100.5
 42.0 4.0
";

fn durable_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = dir.path().join("data");
    config.archive.backend = ArchiveBackend::Local;
    config.archive.local_dir = dir.path().join("raw");
    config
}

#[tokio::test]
async fn test_ingest_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = durable_config(&dir);

    let well_id = {
        let services = Services::open(&config).unwrap();
        let outcome = services
            .pipeline()
            .ingest("bravo.las", BRAVO_LAS.as_bytes().to_vec())
            .await
            .unwrap();
        let IngestOutcome::Ingested(summary) = outcome else {
            panic!("expected a fresh ingestion");
        };
        assert_eq!(summary.well_name, "BRAVO 12-34");
        assert_eq!(summary.curves_ingested, 2);
        assert_eq!(summary.measurements_inserted, 10);
        services.flush().unwrap();
        summary.well_id
    };

    // Raw bytes archived under the basename
    let archived = std::fs::read(dir.path().join("raw").join("bravo.las")).unwrap();
    assert_eq!(archived, BRAVO_LAS.as_bytes());

    let services = Services::open(&config).unwrap();
    let wells = services.catalog().list_wells().unwrap();
    assert_eq!(wells.len(), 1);
    assert_eq!(wells[0].id, well_id);
    assert!(wells[0]
        .archive_url
        .as_deref()
        .is_some_and(|url| url.starts_with("file://")));

    let outcome = services
        .pipeline()
        .ingest("bravo.las", Vec::from("changed"))
        .await
        .unwrap();
    assert!(outcome.is_duplicate());
    assert_eq!(outcome.well_id(), well_id);
}

#[tokio::test]
async fn test_descending_index_reads_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let services = Services::open(&durable_config(&dir)).unwrap();
    let outcome = services
        .pipeline()
        .ingest("bravo.las", BRAVO_LAS.as_bytes().to_vec())
        .await
        .unwrap();

    let catalog = services.catalog();
    let curves = catalog.list_curves(outcome.well_id()).unwrap();
    let mnemonics: Vec<&str> = curves.iter().map(|c| c.mnemonic.as_str()).collect();
    assert_eq!(mnemonics, vec!["ILD", "DT"]);
    assert_eq!(curves[0].unit.as_deref(), Some("OHMM"));

    let rows = catalog.curve_data(curves[0].id, 2001.0, 2003.0).unwrap();
    let depths: Vec<f64> = rows.iter().map(|m| m.depth).collect();
    assert_eq!(depths, vec![2001.0, 2001.5, 2002.0, 2002.5, 2003.0]);
    assert_eq!(rows[2].value, None);
    assert!(rows.windows(2).all(|w| w[0].depth <= w[1].depth));
}

#[tokio::test]
async fn test_interpretation_over_durable_store() {
    let dir = tempfile::tempdir().unwrap();
    let services = Services::open(&durable_config(&dir)).unwrap();
    let outcome = services
        .pipeline()
        .ingest("bravo.las", BRAVO_LAS.as_bytes().to_vec())
        .await
        .unwrap();
    let curves = services.catalog().list_curves(outcome.well_id()).unwrap();
    let engine = services.engine();

    // ILD: nulls dropped; ascending depth order is 32, 30, 28, 25
    let report = engine.interpret(curves[0].id, 2000.0, 2003.0).unwrap();
    assert_eq!(report.curve, "ILD");
    assert_eq!(report.statistics.count, 4);
    assert_eq!(
        report.interpretation,
        vec![
            "Low variability suggests stable formation properties.",
            "Decreasing trend detected across selected depth range.",
        ]
    );

    // DT: mean > 100 fires the sonic rule
    let report = engine.interpret(curves[1].id, 2000.0, 2003.0).unwrap();
    assert!(report
        .interpretation
        .iter()
        .any(|s| s == "High sonic travel time may indicate softer or more porous intervals."));

    let err = engine.interpret(curves[1].id, 2003.0, 2000.0).unwrap_err();
    assert!(matches!(err, InterpretError::InvalidRange(_)));
}

#[tokio::test]
async fn test_wrapped_file_ingests() {
    let services = Services::ephemeral();
    let outcome = services
        .pipeline()
        .ingest("wrapped.las", WRAPPED_LAS.as_bytes().to_vec())
        .await
        .unwrap();
    let IngestOutcome::Ingested(summary) = outcome else {
        panic!("expected a fresh ingestion");
    };
    assert_eq!(summary.well_name, "WRAPPED-1");
    assert_eq!(summary.curves_ingested, 2);
    assert_eq!(summary.measurements_inserted, 4);

    let curves = services.catalog().list_curves(summary.well_id).unwrap();
    let report = services.engine().interpret(curves[1].id, 0.0, 200.0).unwrap();
    // RT mean 3.5 < 5
    assert!(report
        .interpretation
        .iter()
        .any(|s| s == "Low resistivity suggests water-bearing or conductive formation."));
}

#[tokio::test]
async fn test_concurrent_uploads_on_sled_leave_one_well() {
    let dir = tempfile::tempdir().unwrap();
    let services = Services::open(&durable_config(&dir)).unwrap();
    let pipeline = services.pipeline();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let pipeline = pipeline.clone();
        tasks.push(tokio::spawn(async move {
            pipeline
                .ingest("race.las", BRAVO_LAS.as_bytes().to_vec())
                .await
                .unwrap()
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    let fresh = outcomes.iter().filter(|o| !o.is_duplicate()).count();
    assert_eq!(fresh, 1);
    let first = outcomes[0].well_id();
    assert!(outcomes.iter().all(|o| o.well_id() == first));
    assert_eq!(services.catalog().list_wells().unwrap().len(), 1);
}
