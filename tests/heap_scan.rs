use std::sync::Arc;

use heapdb::catalog::{field::Field, schema::Schema, tuple::Tuple, types::Type};
use heapdb::storage::buffer_pool::BufferPool;
use heapdb::storage::heap::HeapFile;
use heapdb::storage::page::heap_page::{slots_per_page, HeapPageBuilder};
use heapdb::storage::page::{PageId, PAGE_SIZE};
use heapdb::storage::transaction::TransactionId;
use heapdb::Error;
use rand::distr::Alphanumeric;
use rand::Rng;
use tempfile::tempdir;

fn people() -> Arc<Schema> {
    let types = [Type::Integer, Type::Varchar];
    Arc::new(Schema::from_types(&types, &[Some("id"), Some("name")]).unwrap())
}

fn random_name(rng: &mut impl Rng) -> String {
    let len = rng.random_range(1..=32);
    rng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// Lays `rows` out over as many pages as needed, filling each page before starting the next.
fn write_rows(file: &HeapFile, rows: &[Vec<Field>]) {
    let schema = file.schema().clone();
    let mut page_number = 0;
    let mut builder =
        HeapPageBuilder::new(PageId::new(file.id(), 0), schema.clone(), PAGE_SIZE).unwrap();
    for row in rows {
        let tuple = Tuple::from_fields(row, &schema).unwrap();
        match builder.push(&tuple) {
            Ok(_) => {}
            Err(Error::OutOfBounds) => {
                file.write_page(&builder.build()).unwrap();
                page_number += 1;
                let page_id = PageId::new(file.id(), page_number);
                builder = HeapPageBuilder::new(page_id, schema.clone(), PAGE_SIZE).unwrap();
                builder.push(&tuple).unwrap();
            }
            Err(e) => panic!("cannot add row {row:?}: {e}"),
        }
    }
    file.write_page(&builder.build()).unwrap();
}

#[test]
fn scan_table_through_small_buffer_pool() {
    let dir = tempdir().unwrap();
    let file = Arc::new(HeapFile::new(dir.path().join("people.dat"), people()).unwrap());

    let mut rng = rand::rng();
    let rows: Vec<Vec<Field>> = (0..100)
        .map(|id| vec![Field::Integer(id), Field::Varchar(random_name(&mut rng))])
        .collect();
    write_rows(&file, &rows);

    let per_page = slots_per_page(PAGE_SIZE, file.schema().size());
    assert_eq!(file.page_count().unwrap() as usize, rows.len().div_ceil(per_page));

    // Fewer frames than pages: the scan has to evict as it goes.
    let pool = BufferPool::new(2, PAGE_SIZE).unwrap();
    pool.register_file(file.clone()).unwrap();
    let txn = TransactionId::new();

    let mut cursor = file.iterator(txn, &pool);
    cursor.open().unwrap();
    let mut scanned = Vec::new();
    while cursor.has_next().unwrap() {
        scanned.push(cursor.next().unwrap().fields(file.schema()).unwrap());
    }
    assert_eq!(scanned, rows);
    assert_eq!(cursor.next(), Err(Error::Exhausted));

    // A rewound cursor sees the same rows again.
    cursor.rewind().unwrap();
    let first = cursor.next().unwrap().fields(file.schema()).unwrap();
    assert_eq!(first, rows[0]);
    cursor.close();
    assert!(!cursor.has_next().unwrap());

    pool.transaction_complete(txn).unwrap();
}

#[test]
fn reopened_file_keeps_its_id_and_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.dat");
    let rows: Vec<Vec<Field>> = (0..10)
        .map(|id| vec![Field::Integer(id), Field::from("x")])
        .collect();

    let id = {
        let file = HeapFile::new(&path, people()).unwrap();
        write_rows(&file, &rows);
        file.id()
    };

    let file = HeapFile::new(&path, people()).unwrap();
    assert_eq!(file.id(), id);
    let pool = BufferPool::default();
    let file = Arc::new(file);
    pool.register_file(file.clone()).unwrap();

    let mut cursor = file.iterator(TransactionId::new(), &pool);
    cursor.open().unwrap();
    let scanned = cursor
        .by_ref()
        .map(|tuple| tuple.and_then(|tuple| tuple.fields(file.schema())))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(scanned, rows);
}
