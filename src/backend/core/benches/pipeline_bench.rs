//! Authorization pipeline benchmarks. Run with: cargo bench --bench pipeline_bench
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hydra_gate::prelude::*;
use hydra_gate::rbac::highest_role;

const SECRET: &str = "bench-secret";

fn pipeline() -> AuthorizationPipeline {
    AuthorizationPipeline::new(
        Arc::new(TokenValidator::from_secret(SECRET).unwrap()),
        LicenseGate::for_service("aiwm"),
    )
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
    headers
}

fn caller() -> Claims {
    Claims::builder("u1")
        .username("alice")
        .roles(["organization.editor", "group.viewer"])
        .org_id("507f1f77bcf86cd799439011")
        .license("aiwm", LicenseTier::Limited)
        .license("cbm", LicenseTier::Full)
        .build()
}

fn bench_validation(c: &mut Criterion) {
    let mut g = c.benchmark_group("token_validation");
    let p = pipeline();
    let token = p.validator().issue(&caller()).unwrap();
    g.bench_function("validate", |b| b.iter(|| black_box(p.validator().validate(&token))));
    g.bench_function("validate_bad_signature", |b| {
        let forged = TokenValidator::from_secret("other").unwrap().issue(&caller()).unwrap();
        b.iter(|| black_box(p.validator().validate(&forged)))
    });
    g.bench_function("issue", |b| {
        let claims = caller();
        b.iter(|| black_box(p.validator().issue(&claims)))
    });
    g.finish();
}

fn bench_gates(c: &mut Criterion) {
    let mut g = c.benchmark_group("gates");
    let p = pipeline();
    let claims = caller();
    let policies = [
        ("none", EndpointPolicy::authenticated()),
        ("license_allow", EndpointPolicy::authenticated().require_license(LicenseTier::Limited)),
        ("license_deny", EndpointPolicy::authenticated().require_license(LicenseTier::Full)),
        ("universe_deny", EndpointPolicy::authenticated().require_universe_role()),
    ];
    for (name, policy) in &policies {
        g.bench_with_input(BenchmarkId::new("check_gates", name), policy, |b, policy| {
            b.iter(|| black_box(p.check_gates(Some(&claims), policy)))
        });
    }
    g.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut g = c.benchmark_group("pipeline");
    let p = pipeline();
    let headers = bearer(&p.validator().issue(&caller()).unwrap());
    let policy = EndpointPolicy::authenticated().require_license(LicenseTier::Limited);
    g.bench_function("authorize_allow", |b| b.iter(|| black_box(p.authorize(&headers, &policy))));
    g.bench_function("authorize_missing_token", |b| {
        let empty = HeaderMap::new();
        b.iter(|| black_box(p.authorize(&empty, &policy)))
    });
    g.finish();
}

fn bench_revocation_lookup(c: &mut Criterion) {
    let mut g = c.benchmark_group("revocation");
    for &n in &[0usize, 1_000, 100_000] {
        let p = pipeline();
        for i in 0..n {
            p.validator().revoke(format!("revoked-{}", i), i64::MAX);
        }
        let token = p.validator().issue(&caller()).unwrap();
        g.throughput(Throughput::Elements(1));
        g.bench_with_input(BenchmarkId::new("validate_with_revocations", n), &n, |b, _| {
            b.iter(|| black_box(p.validator().validate(&token)))
        });
    }
    g.finish();
}

fn bench_role_scope(c: &mut Criterion) {
    let mut g = c.benchmark_group("role_scope");
    let ctx = RequestContext::from_claims(&caller());
    g.bench_function("highest_role", |b| b.iter(|| black_box(highest_role(&ctx.roles))));
    g.bench_function("resolve", |b| b.iter(|| black_box(RoleScope::resolve(&ctx))));
    g.finish();
}

criterion_group!(
    benches,
    bench_validation,
    bench_gates,
    bench_full_pipeline,
    bench_revocation_lookup,
    bench_role_scope
);
criterion_main!(benches);
