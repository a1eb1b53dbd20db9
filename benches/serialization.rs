use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gvariant::{from_bytes, from_text, to_bytes, to_text, Value, VariantDict, VariantType};

fn user_record(id: u32) -> Value {
    let mut dict = VariantDict::new();
    dict.insert("id", Value::new_uint32(id));
    dict.insert("name", Value::new_string(&format!("user{}", id)).unwrap());
    dict.insert("active", Value::new_boolean(id % 2 == 0));
    dict.insert("tags", Value::new_strv(&["admin", "dev"]).unwrap());
    dict.end().unwrap()
}

fn records(size: u32) -> Value {
    Value::new_array(None, (0..size).map(user_record).collect()).unwrap()
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    c.bench_function("serialize_simple_tuple", |b| {
        b.iter(|| {
            let value = Value::new_tuple(vec![
                Value::new_int32(black_box(500)),
                Value::new_string("hi").unwrap(),
            ]);
            to_bytes(&value)
        })
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_records");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| to_bytes(&records(black_box(size))))
        });
    }
    group.finish();
}

fn benchmark_load_and_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_records");
    let ty = VariantType::new("aa{sv}").unwrap();

    for size in [10, 100, 1000].iter() {
        let data = to_bytes(&records(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let value = from_bytes(&ty, data.clone()).unwrap();
                value
                    .iter()
                    .filter_map(|record| record.lookup_value("id", Some(&VariantType::UINT32)))
                    .count()
            })
        });
    }
    group.finish();
}

fn benchmark_random_access(c: &mut Criterion) {
    let data = to_bytes(&records(1000));
    let value = from_bytes(&VariantType::new("aa{sv}").unwrap(), data).unwrap();

    c.bench_function("child_at_index", |b| {
        b.iter(|| value.child(black_box(737)).unwrap())
    });
}

fn benchmark_normal_form(c: &mut Criterion) {
    let data = to_bytes(&records(100));
    let ty = VariantType::new("aa{sv}").unwrap();

    c.bench_function("is_normal_form_untrusted", |b| {
        b.iter(|| from_bytes(&ty, data.clone()).unwrap().is_normal_form())
    });
    c.bench_function("byteswap", |b| {
        let value = from_bytes(&ty, data.clone()).unwrap();
        b.iter(|| value.byteswap())
    });
}

fn benchmark_text(c: &mut Criterion) {
    let value = records(50);
    let text = value.print(true);

    let mut group = c.benchmark_group("text_format");
    group.bench_function("print", |b| b.iter(|| to_text(black_box(&value))));
    group.bench_function("print_annotated", |b| b.iter(|| black_box(&value).print(true)));
    group.bench_function("parse", |b| b.iter(|| from_text(black_box(&text)).unwrap()));
    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let value = records(100);
    let json = serde_json::to_string(&value).unwrap();

    let mut group = c.benchmark_group("binary_vs_json");
    group.bench_function("binary_serialize", |b| b.iter(|| to_bytes(black_box(&value))));
    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&value)))
    });
    group.bench_function("json_parse", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&json)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_serialize_array,
    benchmark_load_and_walk,
    benchmark_random_access,
    benchmark_normal_form,
    benchmark_text,
    benchmark_comparison_with_json
);
criterion_main!(benches);
