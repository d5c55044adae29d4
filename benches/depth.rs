#![allow(clippy::unit_arg)]

use divan::{black_box, Bencher};
use freya_depth::{BTreeBook, Depth, Event, EventKind, OrderBook, Side};
use rand::{distributions::Uniform, prelude::Distribution as _, rngs::StdRng, SeedableRng as _};

const PRICE_LEVELS: i64 = 20;

fn main() {
    divan::main();
}

/// Bids around 1880..1890 and asks around 1884..1894, so both sides churn through their windows.
fn generate_orders(count: usize) -> Vec<(Side, i64, u64)> {
    let price_dist = Uniform::new(0, PRICE_LEVELS / 2);
    let size_dist = Uniform::new(1_u64, 11);
    let mut rng = StdRng::from_seed([42; 32]);
    (0..count)
        .map(|i| {
            let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
            let base = if side.is_buy() { 1880 } else { 1884 };
            (side, base + price_dist.sample(&mut rng), size_dist.sample(&mut rng) * 100)
        })
        .collect()
}

fn add_all<const N: usize>(orders: &[(Side, i64, u64)]) -> Depth<N, i64> {
    let mut depth = Depth::<N, i64>::new();
    for &(side, price, qty) in orders {
        black_box(depth.add(side, price, qty));
    }
    depth
}

#[divan::bench(name = "add/depth", consts = [1, 5, 10])]
fn bench_depth_add<const N: usize>(bencher: Bencher) {
    bencher.with_inputs(|| generate_orders(10_000)).bench_refs(|orders| add_all::<N>(orders));
}

#[divan::bench(name = "add_close/btree_book", consts = [1, 5, 10])]
fn bench_book_add_close<const N: usize>(bencher: Bencher) {
    bencher.with_inputs(|| generate_orders(10_000)).bench_values(|orders| {
        let mut book = BTreeBook::<N, i64>::new();
        for &(side, price, qty) in &orders {
            black_box(book.process(Event::new(EventKind::Add, side, price, qty, 0)));
        }
        for &(side, price, qty) in &orders {
            black_box(book.process(Event::new(EventKind::Close, side, price, qty, 0)));
        }
        black_box(book.depth().last_change())
    });
}

#[divan::bench(name = "amend/depth")]
fn bench_depth_amend(bencher: Bencher) {
    bencher
        .with_inputs(|| {
            let mut depth = Depth::<10, i64>::new();
            for price in 0..10 {
                depth.add_bid(1880 - price, 1_000_000);
                depth.add_ask(1890 + price, 1_000_000);
            }
            depth
        })
        .bench_refs(|depth| {
            for i in 0..10_000_i64 {
                let offset = i % PRICE_LEVELS;
                black_box(depth.increase_bid(1880 - offset, 10));
                black_box(depth.decrease_ask(1890 + offset, 10));
            }
        });
}
