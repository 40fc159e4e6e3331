use std::sync::{Arc, Mutex};

use model::change_event::{AttributeValue, Image};
use repositories::data_lake::MockDataLakeRepository;
use repositories::table_snapshot::MockTableSnapshotRepository;

/// Objects written through a mocked data lake, in write order.
pub type WrittenObjects = Arc<Mutex<Vec<(String, Vec<u8>)>>>;

pub fn item(id: usize) -> Image {
    let mut image = Image::from([
        ("id".to_owned(), AttributeValue::S(format!("item-{id}"))),
        ("quantity".to_owned(), AttributeValue::N(id.to_string())),
    ]);
    if id % 2 == 0 {
        image.insert("even".to_owned(), AttributeValue::Bool(true));
    }
    image
}

/// Table of `items_per_segment` items in each segment it is asked for.
pub fn table(capacity: f64, items_per_segment: usize) -> MockTableSnapshotRepository {
    let mut table = MockTableSnapshotRepository::new();
    table.expect_read_capacity().returning(move || Ok(capacity));
    table
        .expect_scan_segment()
        .returning(move |segment, _, _| {
            let first = segment as usize * items_per_segment;
            Ok((first..first + items_per_segment).map(item).collect())
        });
    table
}

/// Data lake recording purges as an empty-bodied `purge:{prefix}` entry.
pub fn recording_data_lake() -> (MockDataLakeRepository, WrittenObjects) {
    let written: WrittenObjects = Arc::default();
    let mut data_lake = MockDataLakeRepository::new();

    let purges = written.clone();
    data_lake.expect_purge_prefix().returning(move |prefix| {
        purges
            .lock()
            .unwrap()
            .push((format!("purge:{prefix}"), Vec::new()));
        Ok(0)
    });

    let puts = written.clone();
    data_lake.expect_put_object().returning(move |key, body| {
        puts.lock().unwrap().push((key.to_owned(), body));
        Ok(())
    });

    (data_lake, written)
}
