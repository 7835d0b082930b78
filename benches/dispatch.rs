use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use mylib::{registry, Value};

fn bench_free_function_call(c: &mut Criterion) {
    let m = registry::load("mylib").expect("mylib loads");
    let args = [Value::Int(3), Value::Int(4)];
    c.bench_function("call_add_positional", |b| {
        b.iter(|| black_box(m.call("add", black_box(&args)).expect("add succeeds")));
    });
    c.bench_function("call_add_1_keyword", |b| {
        b.iter(|| {
            black_box(
                m.call_kw("add_1", &[], black_box(&[("j", Value::Int(4))]))
                    .expect("add_1 succeeds"),
            )
        });
    });
}

fn bench_overload_dispatch(c: &mut Criterion) {
    let m = registry::load("mylib_object").expect("mylib_object loads");
    let pet = m
        .class("PetOL")
        .and_then(|class| class.construct(&[Value::from("Tom"), Value::Int(2)]))
        .expect("PetOL constructs");

    c.bench_function("method_set_first_overload", |b| {
        b.iter(|| pet.call_method("set", black_box(&[Value::Int(5)])).expect("set(int)"));
    });
    c.bench_function("method_set_second_overload", |b| {
        b.iter(|| {
            pet.call_method("set", black_box(&[Value::from("Rex")]))
                .expect("set(str)")
        });
    });
}

fn bench_inherited_access(c: &mut Criterion) {
    let m = registry::load("mylib_object").expect("mylib_object loads");
    let dog = m
        .call("pet_store", &[])
        .expect("pet_store succeeds")
        .as_object()
        .cloned()
        .expect("pet_store returns an object");

    c.bench_function("inherited_field_read", |b| {
        b.iter(|| black_box(dog.getattr("name").expect("name is readable")));
    });
}

criterion_group!(
    benches,
    bench_free_function_call,
    bench_overload_dispatch,
    bench_inherited_access
);
criterion_main!(benches);
