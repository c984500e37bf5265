use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use merit_ledger::RewardLedger;
use merit_merkle::commit;
use merit_types::{Address, TokenId};

fn ledger_with(addresses: usize) -> RewardLedger {
    let mut ledger = RewardLedger::new(1);
    let token = TokenId::new("0xtoken");
    for i in 0..addresses {
        ledger
            .credit(Address::new(format!("0x{i:040x}")), token.clone(), (i as u128 + 1) * 1000)
            .unwrap();
    }
    ledger
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    for size in [100usize, 1_000, 10_000] {
        let ledger = ledger_with(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| commit(ledger, "benchnet", 0, 1000).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_commit);
criterion_main!(benches);
