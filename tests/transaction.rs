use anyhow::Result;
use tempfile::tempdir;
use tinyrel::{file::block::BlockId, server::db::TinyRel};

#[test]
fn tx_test() -> Result<()> {
    let test_directory = tempdir()?;
    let db = TinyRel::new(test_directory.path(), 400, 8)?;

    let block = BlockId::new("testfile", 1);

    let tx1 = db.transaction()?;
    {
        let mut tx1 = tx1.lock().unwrap();
        tx1.pin(&block)?;
        // values logged as old values for later transactions
        tx1.set_int(&block, 80, 1, false)?;
        tx1.set_string(&block, 40, "one", false)?;
        tx1.commit()?;
    }

    let tx2 = db.transaction()?;
    {
        let mut tx2 = tx2.lock().unwrap();
        tx2.pin(&block)?;
        let ivalue = tx2.get_int(&block, 80)?;
        let svalue = tx2.get_string(&block, 40)?;
        assert_eq!(ivalue, 1);
        assert_eq!(svalue, "one");
        tx2.set_int(&block, 80, ivalue + 1, true)?;
        tx2.set_string(&block, 40, &(svalue + "!"), true)?;
        tx2.commit()?;
    }

    let tx3 = db.transaction()?;
    {
        let mut tx3 = tx3.lock().unwrap();
        tx3.pin(&block)?;
        assert_eq!(tx3.get_int(&block, 80)?, 2);
        assert_eq!(tx3.get_string(&block, 40)?, "one!");

        tx3.set_int(&block, 80, 9999, true)?;
        assert_eq!(tx3.get_int(&block, 80)?, 9999);
        tx3.rollback()?;
    }

    // the rollback restored the pre-image
    let tx4 = db.transaction()?;
    {
        let mut tx4 = tx4.lock().unwrap();
        tx4.pin(&block)?;
        assert_eq!(tx4.get_int(&block, 80)?, 2);
        assert_eq!(tx4.get_string(&block, 40)?, "one!");
        tx4.commit()?;
    }

    Ok(())
}
