//! Error paths: locking, schema versions, unreadable records

use crate::common::*;
use std::io::ErrorKind;

#[test]
fn open_before_build_is_not_initialized() {
    let fx = Fixture::new();
    let err = SdfIndex::open(fx.index_path(), &fx.config).unwrap_err();
    assert!(matches!(err, IndexError::NotInitialized(_)));
}

#[test]
fn concurrent_build_fails_fast() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));

    let holder = IndexEnv::open_writable(fx.index_path(), &fx.config.storage).unwrap();
    let err = fx.try_build().unwrap_err();
    assert!(matches!(err, IndexError::WriterLocked(_)));
    drop(holder);

    fx.build();
    assert!(fx.open().lookup_compound(1).unwrap().is_some());
}

#[test]
fn foreign_schema_version_is_refused_then_rebuilt() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));
    fx.build();

    {
        let env = IndexEnv::open_writable(fx.index_path(), &fx.config.storage).unwrap();
        let mut wtxn = env.write_txn().unwrap();
        env.tables()
            .put_meta_raw(&mut wtxn, br#"{"schema_version": 99}"#)
            .unwrap();
        wtxn.commit().unwrap();
    }

    let err = SdfIndex::open(fx.index_path(), &fx.config).unwrap_err();
    assert!(matches!(
        err,
        IndexError::SchemaVersionMismatch { found: 99, .. }
    ));

    fx.build();
    assert!(fx.open().lookup_compound(1).unwrap().is_some());
}

#[test]
fn missing_source_root_is_an_error() {
    let fx = Fixture::new();
    let missing = fx.root_path().join("gone");
    assert!(SdfIndex::build(&missing, fx.index_path(), &fx.config).is_err());
}

#[test]
fn invalid_config_is_rejected_before_touching_the_index() {
    let mut fx = Fixture::new();
    fx.config.build.delimiter = String::new();
    let err = fx.try_build().unwrap_err();
    assert!(matches!(err, IndexError::InvalidInput(_)));
    assert!(!fx.index_path().join("data.mdb").exists());
}

#[test]
fn unknown_file_id_is_reported() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));
    fx.build();
    let index = fx.open();

    let locator = RecordLocator::new(999, 0, 10, RecordKind::Compound, None).unwrap();
    let err = index.read(&locator).unwrap_err();
    assert!(matches!(err, IndexError::UnknownFile(999)));
}

#[test]
fn shrunken_source_file_is_unexpected_eof() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1, 2, 3]));
    fx.build();
    let index = fx.open();
    let hit = index.lookup_compound(3).unwrap().unwrap();

    fx.write("compound_a.sdf", compound_file([1]));
    match index.read(&hit.locator).unwrap_err() {
        IndexError::Io(e) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn deleted_source_file_is_not_found() {
    let fx = Fixture::new();
    fx.write("compound_a.sdf", compound_file([1]));
    fx.build();
    let index = fx.open();
    let hit = index.lookup_compound(1).unwrap().unwrap();

    std::fs::remove_file(fx.root_path().join("compound_a.sdf")).unwrap();
    match index.read(&hit.locator).unwrap_err() {
        IndexError::Io(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
