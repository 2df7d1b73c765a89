use criterion::{black_box, criterion_group, criterion_main, Criterion};

use agora_types::{
    AssetBundle, AssetId, AssetName, LedgerParams, OutRef, PolicyId, SpendableOutput, TxHash,
    WalletAddress,
};

fn snapshot(size: u32) -> Vec<SpendableOutput> {
    let address = WalletAddress::new("addr_test1qbench").unwrap();
    (0..size)
        .map(|i| {
            let mut assets = AssetBundle::base(1_000_000 + (i as u128 * 7_919) % 5_000_000);
            if i % 3 == 0 {
                let name = AssetName::new(i.to_be_bytes().to_vec()).unwrap();
                assets.set(AssetId::native(PolicyId::new([(i % 5) as u8; 28]), name), 1);
            }
            let mut tx = [0u8; 32];
            tx[..4].copy_from_slice(&i.to_be_bytes());
            SpendableOutput::new(OutRef::new(TxHash::new(tx), i % 2), address.clone(), assets)
        })
        .collect()
}

fn select_small_wallet_bench(c: &mut Criterion) {
    let outputs = snapshot(20);
    let required = AssetBundle::base(10_000_000);
    let params = LedgerParams::default();

    c.bench_function("select_20_outputs", |b| {
        b.iter(|| agora_selection::select(black_box(&outputs), &required, &params))
    });
}

fn select_large_wallet_bench(c: &mut Criterion) {
    let outputs = snapshot(500);
    let required = AssetBundle::base(200_000_000);
    let params = LedgerParams::default();

    c.bench_function("select_500_outputs", |b| {
        b.iter(|| agora_selection::select(black_box(&outputs), &required, &params))
    });
}

criterion_group!(benches, select_small_wallet_bench, select_large_wallet_bench);
criterion_main!(benches);
