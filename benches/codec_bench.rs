use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swsave::{decrypt, encrypt, Block, ScalarValue, TypeCode, XorShift32};

fn bench_keystream(c: &mut Criterion) {
    c.bench_function("keystream_1mb", |b| {
        b.iter(|| {
            let mut ks = XorShift32::new(black_box(0xDEADBEEF));
            let mut acc = 0u8;
            for _ in 0..1024 * 1024 {
                acc ^= ks.next_byte();
            }
            acc
        })
    });
}

fn sample_save() -> Vec<Block> {
    let mut blocks = Vec::new();
    for i in 0..64u32 {
        blocks.push(Block::new_object(0x1000 + i, vec![i as u8; 4096]));
        blocks.push(Block::new_scalar(0x2000 + i, ScalarValue::UInt32(i)));
        blocks.push(
            Block::new_array(0x3000 + i, TypeCode::UInt16, vec![0xAB; 512])
                .expect("sized element tag"),
        );
    }
    blocks
}

fn bench_container(c: &mut Criterion) {
    let blocks = sample_save();
    let file = encrypt(&blocks);

    c.bench_function("encrypt_300k_save", |b| b.iter(|| encrypt(black_box(&blocks))));
    c.bench_function("decrypt_300k_save", |b| b.iter(|| decrypt(black_box(&file)).unwrap()));
}

criterion_group!(benches, bench_keystream, bench_container);
criterion_main!(benches);
