//! Crypto capability throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use capprobe::capability::crypto::{
    CipherMode, CipherSpec, DigestAlgorithm, KeyEncoding, PaddingScheme,
};
use capprobe::capability::{Crypto, StandardCrypto};

const KEY: &str = "9uFCkzsu3NMtL.jC";
const IV: &str = "pf7L-yDtb4-KW4Js";

fn payload(len: usize) -> String {
    "这是一条测试消息abc".chars().cycle().take(len).collect()
}

fn bench_digests(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");

    for size in [64usize, 1024, 16 * 1024] {
        let text = payload(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        for algorithm in DigestAlgorithm::ALL {
            group.bench_with_input(
                BenchmarkId::new(algorithm.call_name(), size),
                &text,
                |b, text| b.iter(|| StandardCrypto.digest(algorithm, black_box(text))),
            );
        }
    }

    group.finish();
}

fn bench_symmetric(c: &mut Criterion) {
    let mut group = c.benchmark_group("symmetric");
    let crypto = StandardCrypto;

    for mode in [CipherMode::Ecb, CipherMode::Cbc, CipherMode::Ctr] {
        let aes = CipherSpec::new(KEY, IV, mode, PaddingScheme::Pkcs);
        let des = CipherSpec::new(&KEY[8..], &IV[8..], mode, PaddingScheme::Pkcs);

        for size in [64usize, 4096] {
            let text = payload(size);
            group.throughput(Throughput::Bytes(text.len() as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("aes_round_trip/{}", mode), size),
                &text,
                |b, text| {
                    b.iter(|| {
                        let sealed = crypto.aes_encrypt(black_box(text), &aes).unwrap();
                        crypto.aes_decrypt(&sealed, &aes).unwrap()
                    })
                },
            );
            group.bench_with_input(
                BenchmarkId::new(format!("des_round_trip/{}", mode), size),
                &text,
                |b, text| {
                    b.iter(|| {
                        let sealed = crypto.des_encrypt(black_box(text), &des).unwrap();
                        crypto.des_decrypt(&sealed, &des).unwrap()
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_rsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("rsa");
    group.sample_size(10);
    let crypto = StandardCrypto;
    let pair = crypto
        .rsa_generate_key_pair(1024, KeyEncoding::Hex, Some("bench"))
        .unwrap();
    let text = payload(16);

    group.bench_function("oaep_round_trip_1024", |b| {
        b.iter(|| {
            let sealed = crypto
                .rsa_encrypt(&pair.public_key, black_box(&text), true)
                .unwrap();
            crypto.rsa_decrypt(&pair.private_key, &sealed, true).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_digests, bench_symmetric, bench_rsa);
criterion_main!(benches);
