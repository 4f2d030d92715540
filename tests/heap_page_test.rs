use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotdb::access::{AccessError, FieldType, Schema, Tuple, TupleId, Value, STRING_LEN};
use slotdb::catalog::TableId;
use slotdb::storage::page::heap_page::{empty_page_data, header_size, slot_capacity};
use slotdb::storage::{HeapPage, Page, PageId, StorageError};
use slotdb::transaction::TransactionId;
use std::sync::Arc;
use std::thread;

const PID: PageId = PageId {
    table_id: TableId(7),
    page_no: 3,
};

fn int_string_schema() -> Arc<Schema> {
    Arc::new(Schema::with_names(&[FieldType::Int, FieldType::String], &["id", "name"]).unwrap())
}

fn random_tuple(rng: &mut StdRng, schema: &Arc<Schema>) -> Tuple {
    let len = rng.gen_range(0..=16);
    let name: String = (0..len)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect();
    Tuple::new(
        schema.clone(),
        vec![Value::Int(rng.gen()), Value::String(name)],
    )
    .unwrap()
}

fn occupied_slots(page: &HeapPage) -> Vec<usize> {
    (0..page.capacity())
        .filter(|&i| page.is_slot_used(i).unwrap())
        .collect()
}

#[test]
fn test_hundred_byte_page_scenario() -> Result<()> {
    let schema = Arc::new(Schema::from_types(&[FieldType::Int])?);
    assert_eq!(schema.byte_width(), 4);

    let mut page = HeapPage::from_bytes(PID, schema.clone(), &empty_page_data(100), 100)?;
    assert_eq!(page.capacity(), 24);
    assert_eq!(page.header_size(), 3);

    let mut rows = Vec::new();
    for i in 0..24 {
        let mut tuple = Tuple::new(schema.clone(), vec![Value::Int(i)])?;
        let id = page.insert_tuple(&mut tuple)?;
        assert_eq!(id, TupleId::new(PID, i as usize));
        rows.push(tuple);
    }

    let mut extra = Tuple::new(schema.clone(), vec![Value::Int(100)])?;
    assert!(matches!(
        page.insert_tuple(&mut extra),
        Err(StorageError::PageFull { .. })
    ));

    page.delete_tuple(&mut rows[5])?;
    assert_eq!(page.insert_tuple(&mut extra)?, TupleId::new(PID, 5));
    assert_eq!(page.num_empty_slots(), 0);
    Ok(())
}

#[test]
fn test_capacity_for_common_page_sizes() {
    assert_eq!(slot_capacity(4096, 20), 4096 * 8 / (20 * 8 + 1));
    assert_eq!(slot_capacity(4096, 20), 203);
    assert_eq!(header_size(slot_capacity(4096, 20)), 26);

    assert_eq!(slot_capacity(8192, 136), 60);
    assert_eq!(header_size(60), 8);

    assert_eq!(slot_capacity(100, 200), 0);
    assert_eq!(header_size(0), 0);
}

#[test]
fn test_randomized_round_trip() -> Result<()> {
    let schema = int_string_schema();
    let mut rng = StdRng::seed_from_u64(0x5107);

    for _ in 0..25 {
        let mut page = HeapPage::from_bytes(PID, schema.clone(), &empty_page_data(4096), 4096)?;
        let inserts = rng.gen_range(0..=page.capacity());
        let mut rows = Vec::with_capacity(inserts);
        for _ in 0..inserts {
            let mut tuple = random_tuple(&mut rng, &schema);
            page.insert_tuple(&mut tuple)?;
            rows.push(tuple);
        }
        for row in rows.iter_mut() {
            if rng.gen_bool(0.4) {
                page.delete_tuple(row)?;
            }
        }

        let data = page.to_bytes()?;
        assert_eq!(data.len(), 4096);

        let decoded = HeapPage::from_bytes(PID, schema.clone(), &data, 4096)?;
        assert_eq!(occupied_slots(&page), occupied_slots(&decoded));
        assert!(page.iter().eq(decoded.iter()));
        for tuple in decoded.iter() {
            let id = tuple.tuple_id().expect("decoded tuple has a location");
            assert_eq!(id.page_id, PID);
            assert_eq!(page.get_tuple(id)?, Some(tuple));
        }
        assert_eq!(
            page.num_empty_slots(),
            page.capacity() - page.iter().count()
        );
    }
    Ok(())
}

#[test]
fn test_before_image_survives_mutation() -> Result<()> {
    let schema = int_string_schema();
    let mut rng = StdRng::seed_from_u64(42);
    let mut page = HeapPage::from_bytes(PID, schema.clone(), &empty_page_data(4096), 4096)?;

    let mut kept = random_tuple(&mut rng, &schema);
    page.insert_tuple(&mut kept)?;
    page.mark_dirty(true, TransactionId::new(9));
    page.capture_before_image()?;
    let baseline = page.to_bytes()?;

    for _ in 0..10 {
        page.insert_tuple(&mut random_tuple(&mut rng, &schema))?;
    }
    page.delete_tuple(&mut kept)?;

    let image = page.before_image()?;
    assert_eq!(image.to_bytes()?, baseline);
    assert_eq!(image.dirty_owner(), None);
    assert_eq!(page.dirty_owner(), Some(TransactionId::new(9)));
    Ok(())
}

#[test]
fn test_before_image_read_concurrently() -> Result<()> {
    let schema = int_string_schema();
    let mut rng = StdRng::seed_from_u64(7);
    let mut page = HeapPage::from_bytes(PID, schema.clone(), &empty_page_data(4096), 4096)?;
    for _ in 0..5 {
        page.insert_tuple(&mut random_tuple(&mut rng, &schema))?;
    }
    page.capture_before_image()?;

    let page = Arc::new(page);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let page = Arc::clone(&page);
        handles.push(thread::spawn(move || -> Result<usize> {
            let mut seen = 0;
            for _ in 0..50 {
                seen = page.before_image()?.iter().count();
            }
            Ok(seen)
        }));
    }
    for _ in 0..50 {
        page.capture_before_image()?;
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap()?, 5);
    }
    Ok(())
}

#[test]
fn test_corrupt_used_slot_is_fatal() {
    let schema = Arc::new(Schema::from_types(&[FieldType::String]).unwrap());
    let mut data = empty_page_data(512);
    let capacity = slot_capacity(512, 132);
    data[0] = 0b0000_0001;
    let start = header_size(capacity);
    // Length prefix claims more bytes than a string field holds.
    data[start..start + 4].copy_from_slice(&u32::MAX.to_be_bytes());

    let result = HeapPage::from_bytes(PID, schema, &data, 512);
    assert!(matches!(
        result,
        Err(StorageError::MalformedData { slot: 0, .. })
    ));
}

#[test]
fn test_invalid_utf8_in_used_slot_is_fatal() {
    let schema = Arc::new(Schema::from_types(&[FieldType::String]).unwrap());
    let mut data = empty_page_data(512);
    data[0] = 0b0000_0001;
    let start = header_size(slot_capacity(512, 132));
    data[start..start + 4].copy_from_slice(&2u32.to_be_bytes());
    data[start + 4] = 0xC3;
    data[start + 5] = 0x28;

    assert!(matches!(
        HeapPage::from_bytes(PID, schema, &data, 512),
        Err(StorageError::MalformedData { slot: 0, .. })
    ));
}

#[test]
fn test_page_stays_serializable_with_longest_strings() -> Result<()> {
    let schema = int_string_schema();
    let mut page = HeapPage::from_bytes(PID, schema.clone(), &empty_page_data(4096), 4096)?;

    let overlong = Tuple::new(
        schema.clone(),
        vec![Value::Int(1), Value::String("y".repeat(STRING_LEN + 1))],
    );
    assert!(matches!(
        overlong,
        Err(AccessError::StringTooLong { len: 129, max: 128 })
    ));

    let mut longest = Tuple::new(
        schema.clone(),
        vec![Value::Int(2), Value::String("y".repeat(STRING_LEN))],
    )?;
    page.insert_tuple(&mut longest)?;
    assert!(longest
        .set_value(1, Value::String("z".repeat(STRING_LEN + 1)))
        .is_err());

    page.capture_before_image()?;
    let data = page.to_bytes()?;
    assert_eq!(data.len(), 4096);
    let decoded = HeapPage::from_bytes(PID, schema, &data, 4096)?;
    assert!(decoded.iter().eq(page.iter()));
    Ok(())
}
