use common::shapes::{Point, Rectangle, ShapeEnum};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use griddb::{EntityKey, Extent, GridContext, GridEntity, GridIndex, TypeFilter};
use rand::prelude::*;

#[derive(Clone, Debug)]
struct Block {
    tag: u8,
    rect: Rectangle,
}

impl GridEntity for Block {
    fn type_tag(&self) -> u8 {
        self.tag
    }

    fn extent(&self) -> Extent {
        Extent::from_rectangle(&self.rect)
    }

    fn collision_geometry(&self) -> Option<ShapeEnum> {
        Some(ShapeEnum::Rectangle(self.rect))
    }
}

fn random_block<R: Rng>(rng: &mut R) -> Block {
    let world = Rectangle::from_min_max(0.0, 0.0, 4000.0, 4000.0);
    let size = rng.gen_range(5.0..60.0);
    let (x, y) = world.get_random_circle_coords_inside(size, rng);
    Block {
        tag: rng.gen_range(0..4),
        rect: Rectangle::new(x, y, size, size),
    }
}

fn populated(context: &GridContext, count: usize) -> (GridIndex<Block>, Vec<EntityKey>) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut index = context.create_index();
    let keys = (0..count)
        .map(|_| index.insert(random_block(&mut rng)).unwrap())
        .collect();
    (index, keys)
}

fn insert_remove_benchmark(c: &mut Criterion) {
    let context = GridContext::new();
    let (mut index, _) = populated(&context, 1000);
    let mut rng = StdRng::seed_from_u64(2);

    c.bench_function("griddb_insert_remove", |b| {
        b.iter(|| {
            let key = index.insert(black_box(random_block(&mut rng))).unwrap();
            index.remove(key);
        })
    });
}

fn update_extent_benchmark(c: &mut Criterion) {
    let context = GridContext::new();
    let (mut index, keys) = populated(&context, 1000);
    let mut rng = StdRng::seed_from_u64(3);

    c.bench_function("griddb_update_extent", |b| {
        b.iter(|| {
            let key = keys[rng.gen_range(0..keys.len())];
            let x = rng.gen_range(0.0..4000.0);
            let y = rng.gen_range(0.0..4000.0);
            let extent = Extent::new_unchecked(x, y, x + 40.0, y + 40.0);
            index.update_extent(black_box(key), extent).unwrap();
        })
    });
}

fn query_benchmark(c: &mut Criterion) {
    let context = GridContext::new();
    let (index, _) = populated(&context, 5000);
    let mut rng = StdRng::seed_from_u64(4);

    c.bench_function("griddb_query_region", |b| {
        b.iter(|| {
            let x = rng.gen_range(0.0..3800.0);
            let y = rng.gen_range(0.0..3800.0);
            let region = Extent::new_unchecked(x, y, x + 200.0, y + 200.0);
            black_box(index.query(TypeFilter::Type(1), Some(&region)));
        })
    });
}

fn ray_cast_benchmark(c: &mut Criterion) {
    let context = GridContext::new();
    let (index, _) = populated(&context, 5000);
    let mut rng = StdRng::seed_from_u64(5);

    c.bench_function("griddb_ray_cast", |b| {
        b.iter(|| {
            let start = Point::new(rng.gen_range(0.0..4000.0), rng.gen_range(0.0..4000.0));
            let end = Point::new(rng.gen_range(0.0..4000.0), rng.gen_range(0.0..4000.0));
            black_box(index.ray_cast(start, end, TypeFilter::All));
        })
    });
}

criterion_group!(
    griddb_benchmarks,
    insert_remove_benchmark,
    update_extent_benchmark,
    query_benchmark,
    ray_cast_benchmark
);
criterion_main!(griddb_benchmarks);
