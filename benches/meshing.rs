use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voxel_streaming::{
    BlockSide, BlockType, Chunk, ChunkKey, ChunkNeighbors, MeshBuilder, TerrainConfig,
    TerrainGenerator,
};

fn bench_meshing(c: &mut Criterion) {
    let generator = TerrainGenerator::new(TerrainConfig::default());
    let key = ChunkKey::new(0, 0, 0);
    let air = Chunk::empty(ChunkKey::new(0, 1, 0));

    let mut group = c.benchmark_group("mesh_chunk");
    let chunks = [
        ("terrain", generator.generate(key)),
        ("solid", Chunk::solid(key, BlockType::STONE)),
        ("air", Chunk::empty(key)),
    ];
    for (name, chunk) in &chunks {
        group.bench_with_input(BenchmarkId::from_parameter(name), chunk, |b, chunk| {
            let neighbors = ChunkNeighbors::empty();
            b.iter(|| MeshBuilder::build(black_box(chunk), &neighbors))
        });
    }
    group.finish();

    c.bench_function("mesh_terrain_with_neighbors", |b| {
        let chunk = generator.generate(key);
        let below = generator.generate(ChunkKey::new(0, -1, 0));
        let neighbors = ChunkNeighbors::empty()
            .with(BlockSide::TOP, &air)
            .with(BlockSide::BOTTOM, &below);
        b.iter(|| MeshBuilder::build(black_box(&chunk), &neighbors))
    });
}

criterion_group!(benches, bench_meshing);
criterion_main!(benches);
