use bisect::{
    FiducciaMattheysesConfig, Graph, KernighanLinConfig, LevelBisectionConfig, SourceVertex, SpectralBisectionConfig,
};
use std::time;

/// A `width` x `height` grid mesh with unit weights.
fn grid(width: usize, height: usize) -> Graph {
    let mut graph = Graph::new(width * height);
    for y in 0..height {
        for x in 0..width {
            let vx = y * width + x;
            if x + 1 < width {
                graph.add_edge(vx, vx + 1, 1.0).unwrap();
            }
            if y + 1 < height {
                graph.add_edge(vx, vx + width, 1.0).unwrap();
            }
        }
    }
    graph
}

fn main() {
    env_logger::init();
    let graph = grid(24, 16);

    let t1 = time::Instant::now();
    let levels = graph
        .bisect_levels(&LevelBisectionConfig {
            source: SourceVertex::PseudoPeripheral,
        })
        .unwrap();
    let bfs_cut = graph.cut_weight(&levels.partition).unwrap();
    println!(
        "bfs: cut {bfs_cut}, sizes {:?}, time: {}ms",
        levels.partition.side_sizes(),
        t1.elapsed().as_millis()
    );

    let t1 = time::Instant::now();
    let kl = graph
        .refine_kernighan_lin(&levels.partition, &KernighanLinConfig::default())
        .unwrap();
    println!(
        "bfs + kl: cut {}, passes {}, time: {}ms",
        kl.cut_weight,
        kl.passes.len(),
        t1.elapsed().as_millis()
    );

    let t1 = time::Instant::now();
    let fm = graph
        .refine_fiduccia_mattheyses(&levels.partition, &FiducciaMattheysesConfig::default())
        .unwrap();
    println!(
        "bfs + fm: cut {}, sizes {:?}, passes {}, time: {}ms",
        fm.cut_weight,
        fm.partition.side_sizes(),
        fm.passes.len(),
        t1.elapsed().as_millis()
    );

    let t1 = time::Instant::now();
    let spectral = graph.bisect_spectral(&SpectralBisectionConfig::default()).unwrap();
    println!(
        "spectral: cut {}, sizes {:?}, fiedler value {:.6}, time: {}ms",
        spectral.cut_weight,
        spectral.partition.side_sizes(),
        spectral.fiedler_value,
        t1.elapsed().as_millis()
    );
}
