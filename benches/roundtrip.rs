//! Append-then-persist round trip at a few collection sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures_executor::block_on;
use gps_history::collection::Collection;
use gps_history::config::ContainerSettings;
use gps_history::persistence::registry::PersisterRegistry;
use gps_history::persistence::stream::{ChunkedReader, ChunkedWriter, MemoryChunkSink, MemoryChunkSource};
use gps_history::persistence::{read, write};
use gps_history::record::Point;

fn point(time: u32) -> Point {
    Point { time, latitude: 45.5, longitude: -122.6, altitude: Some(30.0) }
}

fn roundtrip(npoints: u32) {
    let mut registry = PersisterRegistry::new();
    registry.register::<Point>().unwrap();

    let mut source: Collection<Point> = Collection::new();
    for t in 0..npoints {
        source.push(point(t)).unwrap();
    }

    let container = ContainerSettings::new();
    block_on(async {
        let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
        write(&source, &mut writer, Vec::new(), &container).await.unwrap();
        let bytes = writer.into_inner().bytes;

        let mut dest: Collection<Point> = Collection::new();
        let mut reader = ChunkedReader::new(MemoryChunkSource::new(bytes, 64 * 1024));
        read(&mut dest, &mut reader, &registry, false, &container).await.unwrap();
        assert_eq!(npoints as usize, dest.len());
    });
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    for npoints in [0u32, 1, 100, 10_000] {
        group.throughput(Throughput::Elements(npoints as u64));
        group.bench_with_input(BenchmarkId::from_parameter(npoints), &npoints, |b, &n| {
            b.iter(|| roundtrip(n));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
