use std::sync::Arc;

use anyhow::Result;
use tempfile::tempdir;
use tinyrel::{
    query::scan::{Scan as _, UpdateScan as _},
    record::{layout::Layout, schema::Schema, table_scan::TableScan},
    server::db::TinyRel,
};

#[test]
fn table_scan_test() -> Result<()> {
    let test_directory = tempdir()?;
    let db = TinyRel::new(test_directory.path(), 400, 8)?;
    let tx = db.transaction()?;

    let mut sch = Schema::default();
    sch.add_int_field("A");
    sch.add_string_field("B", 9);
    let layout = Arc::new(Layout::try_from_schema(Arc::new(sch))?);

    let mut ts = TableScan::new(tx.clone(), "T", layout)?;
    for n in 0..50 {
        ts.insert()?;
        ts.set_int("A", n)?;
        ts.set_string("B", &format!("rec{}", n))?;
    }

    let mut deleted = 0;
    ts.before_first()?;
    while ts.next()? {
        if ts.get_int("A")? < 25 {
            ts.delete()?;
            deleted += 1;
        }
    }
    assert_eq!(deleted, 25);

    let mut remaining = 0;
    ts.before_first()?;
    while ts.next()? {
        let a = ts.get_int("A")?;
        assert!(a >= 25, "record {} should have been deleted", a);
        assert_eq!(ts.get_string("B")?, format!("rec{}", a));
        remaining += 1;
    }
    assert_eq!(remaining, 25);

    // exhaustion is sticky until the scan is rewound
    assert!(!ts.next()?);
    assert!(!ts.next()?);
    ts.before_first()?;
    assert!(ts.next()?);

    ts.close();
    tx.lock().unwrap().commit()?;
    Ok(())
}

#[test]
fn empty_table_scan_test() -> Result<()> {
    let test_directory = tempdir()?;
    let db = TinyRel::new(test_directory.path(), 400, 8)?;
    let tx = db.transaction()?;

    let mut sch = Schema::default();
    sch.add_int_field("A");
    let layout = Arc::new(Layout::try_from_schema(Arc::new(sch))?);

    let mut ts = TableScan::new(tx.clone(), "empty", layout)?;
    assert!(!ts.next()?);
    assert!(!ts.next()?);

    ts.close();
    tx.lock().unwrap().commit()?;
    Ok(())
}
