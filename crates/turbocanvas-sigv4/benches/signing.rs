//! Signing throughput benchmarks

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use turbocanvas_sigv4::{
    CanonicalizationPolicy, Credentials, SignableRequest, SigningParams, derive_signing_key, sign,
};

fn bench_derive_signing_key(c: &mut Criterion) {
    c.bench_function("derive_signing_key", |b| {
        b.iter(|| {
            derive_signing_key(
                black_box("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
                black_box("20240102"),
                black_box("us-east-1"),
                black_box("bedrock"),
            )
        })
    });
}

fn bench_sign(c: &mut Criterion) {
    let creds = Credentials::new(
        "AKIDEXAMPLE",
        "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        Some("session-token".to_string()),
    );
    let params = SigningParams {
        region: "us-east-1",
        service: "bedrock",
        timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        policy: CanonicalizationPolicy::DIRECT_MODEL,
    };
    let url: url::Url =
        "https://bedrock-runtime.us-east-1.amazonaws.com/model/stability.stable-diffusion-xl-v1:0/invoke"
            .parse()
            .unwrap();

    let mut group = c.benchmark_group("sign");
    for size in [64usize, 4 * 1024, 64 * 1024] {
        let body = vec![b'a'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| {
                let mut request = SignableRequest::post(url.clone(), body.clone());
                request
                    .set_header("content-type", "application/json")
                    .unwrap();
                sign(&mut request, &creds, &params).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_derive_signing_key, bench_sign);
criterion_main!(benches);
