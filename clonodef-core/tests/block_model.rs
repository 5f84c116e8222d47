use clonodef_core::model::STATS_OUTPUT;
use clonodef_core::{BlockArgs, BlockModel, NumberingScheme, PlRef, SnapshotPool, StaticEngineOutputs, StatsRecord};
use std::io::Write;
use tempfile::NamedTempFile;

// Bulk IG dataset with a heavy-chain VDJRegion and a light-chain CDR3,
// and a single-cell dataset with only the heavy primary chain.
const SNAPSHOT: &str = r#"{
  "columns": [
    {
      "ref": {"blockId": "mixcr", "name": "bulk-abundance"},
      "label": "Bulk IG / reads",
      "spec": {
        "name": "pl7.app/vdj/readCount",
        "valueType": "Long",
        "axesSpec": [
          {"name": "pl7.app/sampleId"},
          {"name": "pl7.app/vdj/clonotypeKey"}
        ],
        "annotations": {"pl7.app/isAnchor": "true"}
      }
    },
    {
      "ref": {"blockId": "mixcr", "name": "bulk-vdj-aa-heavy"},
      "label": "VDJRegionInFrame aa Heavy",
      "spec": {
        "name": "pl7.app/vdj/sequence",
        "axesSpec": [{"name": "pl7.app/vdj/clonotypeKey"}],
        "domain": {
          "pl7.app/alphabet": "aminoacid",
          "pl7.app/vdj/feature": "VDJRegion",
          "pl7.app/vdj/chain": "IGHeavy"
        },
        "annotations": {"pl7.app/vdj/isAssemblingFeature": "true"}
      }
    },
    {
      "ref": {"blockId": "mixcr", "name": "bulk-cdr3-aa-light"},
      "label": "CDR3 aa Light",
      "spec": {
        "name": "pl7.app/vdj/sequence",
        "axesSpec": [{"name": "pl7.app/vdj/clonotypeKey"}],
        "domain": {
          "pl7.app/alphabet": "aminoacid",
          "pl7.app/vdj/feature": "CDR3",
          "pl7.app/vdj/chain": "IGLight"
        }
      }
    },
    {
      "ref": {"blockId": "sc", "name": "sc-abundance"},
      "label": "Single-cell IG / cells",
      "spec": {
        "name": "pl7.app/vdj/uniqueCellCount",
        "axesSpec": [
          {"name": "pl7.app/sampleId"},
          {"name": "pl7.app/vdj/scClonotypeKey"}
        ],
        "annotations": {"pl7.app/isAnchor": "true"}
      }
    },
    {
      "ref": {"blockId": "sc", "name": "sc-vdj-aa-a"},
      "label": "VDJRegion aa Heavy primary",
      "spec": {
        "name": "pl7.app/vdj/sequence",
        "axesSpec": [
          {"name": "pl7.app/vdj/scClonotypeKey", "domain": {"pl7.app/vdj/receptor": "IG"}}
        ],
        "domain": {
          "pl7.app/alphabet": "aminoacid",
          "pl7.app/vdj/feature": "VDJRegion",
          "pl7.app/vdj/scClonotypeChain": "A",
          "pl7.app/vdj/scClonotypeChain/index": "primary"
        },
        "annotations": {"pl7.app/vdj/isAssemblingFeature": "true"}
      }
    }
  ]
}"#;

fn snapshot_file() -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("create temp snapshot");
    write!(f, "{}", SNAPSHOT).unwrap();
    f.as_file().sync_all().unwrap();
    f
}

#[test]
fn bulk_dataset_end_to_end() {
    let snapshot = snapshot_file();
    let pool = SnapshotPool::from_file(snapshot.path()).expect("load snapshot");
    assert_eq!(pool.columns.len(), 5);

    let mut model = BlockModel::with_args(BlockArgs {
        anchor_ref: Some(PlRef::new("mixcr", "bulk-abundance")),
        numbering_scheme: Some(NumberingScheme::Imgt),
        ..BlockArgs::default()
    });
    assert!(!model.is_valid());

    let engine = StaticEngineOutputs::running();
    let outputs = model.outputs(&pool, Some(&engine));
    assert_eq!(outputs.dataset_options.len(), 2);
    assert!(outputs.is_running);
    assert!(outputs.stats.is_none());
    // Heavy chain alone is enough in bulk.
    assert_eq!(outputs.numbering_available, Some(true));

    let options = outputs.clonotype_definition_options.expect("anchor resolved");
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["VDJRegionInFrame aa Heavy", "CDR3 aa Light"]);

    model.args_mut().clonotype_definition = options.iter().map(|o| o.value.clone()).collect();
    assert!(model.is_valid());
    assert!(model.sync_default_label(Some(&options)));
    assert_eq!(model.subtitle(), "VDJRegion aa Heavy-CDR3 aa Light");

    let engine = StaticEngineOutputs::finished()
        .with_artifact(STATS_OUTPUT, "nClonotypesBefore\tnClonotypesAfter\n120\t87\n");
    let outputs = model.outputs(&pool, Some(&engine));
    assert!(!outputs.is_running);
    assert_eq!(outputs.stats, Some(StatsRecord { before: 120, after: 87 }));
}

#[test]
fn single_cell_needs_both_primary_chains() {
    let pool = SnapshotPool::from_json_str(SNAPSHOT).expect("parse snapshot");
    let mut model = BlockModel::with_args(BlockArgs {
        anchor_ref: Some(PlRef::new("sc", "sc-abundance")),
        ..BlockArgs::default()
    });

    let outputs = model.outputs(&pool, None);
    assert_eq!(outputs.numbering_available, Some(false));
    assert!(!outputs.is_running);

    let options = outputs.clonotype_definition_options.expect("anchor resolved");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].label, "VDJRegion aa Heavy primary");
}

#[test]
fn outputs_serialize_for_the_host() {
    let pool = SnapshotPool::from_json_str(SNAPSHOT).expect("parse snapshot");
    let mut model = BlockModel::new();
    let outputs = model.outputs(&pool, None);

    let json = serde_json::to_value(&outputs).unwrap();
    assert!(json.get("datasetOptions").is_some());
    assert!(json["clonotypeDefinitionOptions"].is_null());
    assert!(json["numberingAvailable"].is_null());
    assert_eq!(json["isRunning"], serde_json::Value::Bool(false));
}

#[test]
fn duplicate_refs_are_rejected() {
    let json = r#"{"columns": [
        {"ref": {"blockId": "b", "name": "n"}, "label": "a", "spec": {"name": "x"}},
        {"ref": {"blockId": "b", "name": "n"}, "label": "b", "spec": {"name": "y"}}
    ]}"#;
    assert!(SnapshotPool::from_json_str(json).is_err());
}
