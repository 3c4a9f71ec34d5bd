//! # Doc-Ledger Benchmarks
//!
//! | Path | Work per iteration |
//! |------|--------------------|
//! | address derivation | two SHA-512 digests |
//! | payload encoding | canonical CBOR of a proposal payload |
//! | transaction build | encode, hash and sign one transaction |
//! | batch build | sign a batch header over 1..=64 transactions |
//! | content digest | SHA-512 over document-sized content |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dl_01_address_codec::{DocTrackerAddresses, ProposalAddresses};
use dl_02_payload_codec::{encode, PayloadFields};
use dl_03_transaction_builder::{BatchBuilder, ProposalTransactions};
use dl_07_content_verifier::content_digest;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{DocumentKey, DocumentStatus, NewProposal};

fn proposal(n: usize) -> NewProposal {
    NewProposal {
        proposal_id: format!("proposal-{n}"),
        document: DocumentKey::general("dash"),
        author: "alice".into(),
        content_hash: content_digest(format!("content {n}").as_bytes()),
        proposed_status: DocumentStatus::Active,
    }
}

fn bench_addresses(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-01-address-codec");
    let proposals = ProposalAddresses::global();
    let documents = DocTrackerAddresses::global();
    let key = DocumentKey::general("dash");

    group.bench_function("proposal_address", |b| {
        b.iter(|| proposals.proposal(black_box("60a9e27b2ca2d845d7304a0955a1b358")))
    });
    group.bench_function("document_version_address", |b| {
        b.iter(|| documents.document_version(black_box(&key), black_box(42)))
    });
    group.finish();
}

fn bench_payload(c: &mut Criterion) {
    let fields = PayloadFields::new()
        .with("proposalID", "60a9e27b2ca2d845d7304a0955a1b358")
        .with("category", "general")
        .with("docName", "dash")
        .with("contentHash", content_digest(b"content").as_str())
        .with("signers", vec!["bob".to_string(), "carol".to_string()]);

    c.bench_function("dl-02-payload-codec/encode", |b| b.iter(|| encode(black_box(&fields))));
}

fn bench_transactions(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-03-transaction-builder");
    let signer = Secp256k1KeyPair::generate();
    let builder = ProposalTransactions::global();

    group.bench_function("insert_proposal", |b| {
        let proposal = proposal(0);
        b.iter(|| builder.insert(black_box(&proposal), &signer))
    });

    for size in [1usize, 16, 64] {
        let transactions: Vec<_> = (0..size)
            .map(|n| builder.insert(&proposal(n), &signer).expect("transaction builds"))
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("batch", size), &transactions, |b, txs| {
            b.iter(|| BatchBuilder::build(txs.clone(), &signer))
        });
    }
    group.finish();
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-07-content-verifier");
    for size in [1024usize, 64 * 1024, 1024 * 1024] {
        let content = vec![0x5a; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("content_digest", size), &content, |b, content| {
            b.iter(|| content_digest(black_box(content)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_addresses, bench_payload, bench_transactions, bench_digest);
criterion_main!(benches);
