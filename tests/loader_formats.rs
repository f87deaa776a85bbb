use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use sales_dashboard::data::export::to_csv;
use sales_dashboard::data::filter::{apply, FilterCriteria};
use sales_dashboard::data::loader::{load_file, LoadError, LoadOptions};
use sales_dashboard::data::model::Column;
use tempfile::{tempdir, TempDir};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const SALES_CSV: &str = "\
Tarih,Şehir,Kategori,Ürün,Adet,Toplam Satış
2024-01-01,Istanbul,Food,Ekmek,2,100.00
2024-01-02 14:30:00,Ankara,Drink,Su,1,50.00
2024-01-02,Istanbul,Food,Peynir,1,30.00
";

#[test]
fn loads_localized_csv_and_runs_the_worked_example() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "sales_data.csv", SALES_CSV);

    let ds = load_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.headers, vec!["Tarih", "Şehir", "Kategori", "Ürün", "Adet", "Toplam Satış"]);
    assert_eq!(ds.columns[3], Column::Extra(0));
    assert_eq!(ds.records[1].date, d(2024, 1, 2));
    assert_eq!(ds.records[2].extra, vec!["Peynir".to_string()]);
    assert_eq!(ds.date_bounds, Some((d(2024, 1, 1), d(2024, 1, 2))));

    let mut criteria = FilterCriteria::all(&ds);
    criteria.cities.retain(|c| c == "Istanbul");
    criteria.categories.retain(|c| c == "Food");
    let view = apply(&ds, &criteria);

    assert_eq!(view.record_count, 2);
    assert_eq!(view.total_sales_sum, 130.0);
    assert_eq!(view.total_quantity_sum, 3);
    assert_eq!(view.by_date, vec![(d(2024, 1, 1), 100.0), (d(2024, 1, 2), 30.0)]);
}

#[test]
fn exported_csv_loads_back_identically() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "sales_data.csv", SALES_CSV);
    let ds = load_file(&path, &LoadOptions::default()).unwrap();

    let exported = write(
        &dir,
        "filtrelenmis_satislar.csv",
        &String::from_utf8(to_csv(&ds, &ds.records).unwrap()).unwrap(),
    );
    let reloaded = load_file(&exported, &LoadOptions::default()).unwrap();

    assert_eq!(reloaded.headers, ds.headers);
    assert_eq!(reloaded.records, ds.records);
}

#[test]
fn honours_configured_delimiter_and_tsv() {
    let dir = tempdir().unwrap();
    let semicolon = write(
        &dir,
        "sales.csv",
        "Tarih;Şehir;Kategori;Toplam Satış;Adet\n01.02.2024;Bursa;Temizlik;12,5;1\n",
    );
    let options = LoadOptions {
        delimiter: b';',
        ..LoadOptions::default()
    };
    // Decimal commas are not numbers.
    assert!(matches!(
        load_file(&semicolon, &options),
        Err(LoadError::InvalidNumber { row: 1, .. })
    ));

    let tsv = write(
        &dir,
        "sales.tsv",
        "Tarih\tŞehir\tKategori\tToplam Satış\tAdet\n2024-02-01\tBursa\tTemizlik\t12.5\t1\n",
    );
    let ds = load_file(&tsv, &LoadOptions::default()).unwrap();
    assert_eq!(ds.records[0].total_sale, 12.5);
}

#[test]
fn loads_records_oriented_json() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "sales.json",
        r#"[
            {"Tarih": "2024-03-01T00:00:00", "Şehir": "İzmir", "Kategori": "Gıda", "Toplam Satış": 20.5, "Adet": 2},
            {"Tarih": "2024-03-02", "Şehir": "İzmir", "Kategori": "İçecek", "Toplam Satış": 7, "Adet": 1.0, "Not": "kampanya"}
        ]"#,
    );

    let ds = load_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(ds.headers.last().map(String::as_str), Some("Not"));
    assert_eq!(ds.records[0].extra, vec![String::new()]);
    assert_eq!(ds.records[1].extra, vec!["kampanya".to_string()]);
    assert_eq!(ds.records[1].quantity, 1);
    assert_eq!(ds.records[1].total_sale, 7.0);
    assert_eq!(ds.records[0].date, d(2024, 3, 1));
}

#[test]
fn loads_parquet_with_date32_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sales.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Tarih", DataType::Date32, false),
        Field::new("Şehir", DataType::Utf8, false),
        Field::new("Kategori", DataType::Utf8, false),
        Field::new("Toplam Satış", DataType::Float64, false),
        Field::new("Adet", DataType::Int64, false),
    ]));
    // 19723 days after 1970-01-01 is 2024-01-01.
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(vec![19723, 19724])),
            Arc::new(StringArray::from(vec!["Antalya", "Ankara"])),
            Arc::new(StringArray::from(vec!["Gıda", "Gıda"])),
            Arc::new(Float64Array::from(vec![99.9, 10.0])),
            Arc::new(Int64Array::from(vec![3, 1])),
        ],
    )
    .unwrap();

    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.records[0].date, d(2024, 1, 1));
    assert_eq!(ds.records[1].date, d(2024, 1, 2));
    assert_eq!(ds.records[0].total_sale, 99.9);
    assert_eq!(ds.records[0].quantity, 3);
}

#[test]
fn fatal_errors_are_typed() {
    let dir = tempdir().unwrap();

    let missing = dir.path().join("nope.csv");
    assert!(matches!(
        load_file(&missing, &LoadOptions::default()),
        Err(LoadError::Io { .. })
    ));

    let no_quantity = write(&dir, "a.csv", "Tarih,Şehir,Kategori,Toplam Satış\n2024-01-01,A,B,1\n");
    assert!(matches!(
        load_file(&no_quantity, &LoadOptions::default()),
        Err(LoadError::MissingColumn(c)) if c == "Adet"
    ));

    let bad_date = write(&dir, "b.csv", "Tarih,Şehir,Kategori,Toplam Satış,Adet\n2024-01-01,A,B,1,1\nsoon,A,B,1,1\n");
    assert!(matches!(
        load_file(&bad_date, &LoadOptions::default()),
        Err(LoadError::InvalidDate { row: 2, .. })
    ));

    let huge_quantity = write(
        &dir,
        "e.csv",
        "Tarih,Şehir,Kategori,Toplam Satış,Adet\n2024-01-01,A,B,1,1e30\n2024-01-02,A,B,1,1e19\n",
    );
    assert!(matches!(
        load_file(&huge_quantity, &LoadOptions::default()),
        Err(LoadError::InvalidNumber { row: 1, column, value }) if column == "Adet" && value == "1e30"
    ));

    let ragged = write(&dir, "c.csv", "Tarih,Şehir,Kategori,Toplam Satış,Adet\n2024-01-01,A,B\n");
    assert!(matches!(
        load_file(&ragged, &LoadOptions::default()),
        Err(LoadError::Csv(_))
    ));

    let xlsx = write(&dir, "d.xlsx", "");
    assert!(matches!(
        load_file(&xlsx, &LoadOptions::default()),
        Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
    ));
}

#[test]
fn header_only_file_is_an_empty_dataset() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "empty.csv", "Tarih,Şehir,Kategori,Toplam Satış,Adet\n");

    let ds = load_file(&path, &LoadOptions::default()).unwrap();
    assert!(ds.is_empty());
    assert!(apply(&ds, &FilterCriteria::all(&ds)).is_empty());
}
