use criterion::{Criterion, criterion_group, criterion_main};

use sfatfs::prelude::*;

criterion_group!(benches, sfat_component_bench);
criterion_main!(benches);

pub fn sfat_component_bench(c: &mut Criterion) {
    let config = SfatConfig::default();
    let meta = SfatMeta::new(&config).expect("invalid config");
    let label = meta.default_label();

    let mut buf = vec![0u8; config.capacity as usize];
    let mut mem_io = MemVolumeIO::new(&mut buf);

    c.bench_function("sfat_format", |b| {
        b.iter(|| {
            let mut formatter = SfatFormatter::new(&mut mem_io, &meta, label.as_bytes());
            formatter.format().expect("format failed");
        });
    });

    let mut fs = SfatFs::new(&mut mem_io, &config).expect("new failed");
    fs.mount().expect("mount failed");

    c.bench_function("sfat_write_delete", |b| {
        b.iter(|| {
            let mut fh = fs.create("a").expect("create failed");
            fs.write(&mut fh, &[b'a'; 510]).expect("write failed");
            fs.delete(&mut fh).expect("delete failed");
        });
    });

    c.bench_function("sfat_check", |b| {
        b.iter(|| {
            let rep = fs.check().expect("check failed");
            assert!(rep.ok());
        });
    });
}
