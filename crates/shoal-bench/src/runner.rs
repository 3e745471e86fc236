use std::time::Instant;

use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::config::LiquidConfig;
use shoal_core::error::CatalogError;
use shoal_persist::codec::LiquidCodec;
use shoal_persist::cursor::{ByteReader, ByteWriter};
use shoal_world::stack::{LiquidLayerStack, PaintOptions};
use shoal_world::terrain::NoiseTerrain;

use crate::scenes::{self, SceneChunk, SceneConfig, Workload};

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub chunk_count: u32,
    pub layer_count: u32,
    /// Encoded size of the scene's liquid in the modern layout.
    pub encoded_bytes: usize,
    pub iterations: u32,
    pub timings: TimingSeries,
}

/// Runs liquid workloads on the CPU against procedural terrain.
pub struct BenchmarkRunner {
    catalog: LiquidTypeCatalog,
    config: LiquidConfig,
    terrain: NoiseTerrain,
    iterations: u32,
}

impl BenchmarkRunner {
    /// Load the bundled liquid types and configuration.
    pub fn new(iterations: u32) -> Result<Self, CatalogError> {
        let catalog =
            LiquidTypeCatalog::from_ron_str(include_str!("../../../data/liquid_types.ron"))?;
        let config = LiquidConfig::from_ron_str(include_str!("../../../data/liquid_config.ron"))?;
        log::info!("Loaded {} liquid types", catalog.len());

        Ok(Self {
            catalog,
            config,
            terrain: NoiseTerrain::new(42, 0.0, 12.0), // fixed seed for determinism
            iterations,
        })
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, scene: &SceneConfig) -> BenchmarkResult {
        log::info!(
            "Running scene '{}' ({}x{} chunks)...",
            scene.name,
            scene.chunks_per_side,
            scene.chunks_per_side
        );

        let chunks = scenes::build_scene(scene, &self.terrain, &self.catalog, &self.config);
        let layer_count: usize = chunks.iter().map(|c| c.stack.layer_count()).sum();
        let encoded = encode_all(&chunks);
        log::info!(
            "  Populated {} layers, {} encoded bytes",
            layer_count,
            encoded.len()
        );

        let mut frame_times = Vec::with_capacity(self.iterations as usize);
        for _ in 0..self.iterations {
            let elapsed = match scene.workload {
                Workload::Paint => self.time_paint(scene, &chunks),
                Workload::Crop => self.time_crop(&chunks),
                Workload::Encode => time(|| encode_all(&chunks).len()),
                Workload::Decode => self.time_decode(&chunks, &encoded),
                Workload::Legacy => self.time_legacy(&chunks),
            };
            frame_times.push(elapsed);
        }

        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.3}ms, p95={:.3}ms, p99={:.3}ms",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        BenchmarkResult {
            scene_name: scene.name.to_string(),
            chunk_count: chunks.len() as u32,
            layer_count: layer_count as u32,
            encoded_bytes: encoded.len(),
            iterations: self.iterations,
            timings,
        }
    }

    fn time_paint(&self, scene: &SceneConfig, chunks: &[SceneChunk]) -> f64 {
        let mut stacks: Vec<LiquidLayerStack> = chunks.iter().map(|c| c.stack.clone()).collect();
        let start = Instant::now();
        for (stack, chunk) in stacks.iter_mut().zip(chunks) {
            let strokes = scenes::stroke(stack.origin(), scene.sea_level + 1.0, scene.brush_radius);
            for (i, brush) in strokes.iter().enumerate() {
                let options = PaintOptions::add(self.config.opacity_factor)
                    .with_override_liquid_id(i % 3 == 0);
                let _ = stack.paint_liquid(
                    brush,
                    scenes::stroke_liquid(i),
                    options,
                    &chunk.terrain,
                    &self.catalog,
                );
            }
        }
        start.elapsed().as_secs_f64() * 1000.0
    }

    fn time_crop(&self, chunks: &[SceneChunk]) -> f64 {
        let mut stacks: Vec<LiquidLayerStack> = chunks.iter().map(|c| c.stack.clone()).collect();
        let start = Instant::now();
        for (stack, chunk) in stacks.iter_mut().zip(chunks) {
            let _ = stack.crop(&chunk.terrain);
            let _ = stack.auto_gen_opacity(&chunk.terrain, self.config.opacity_factor);
        }
        start.elapsed().as_secs_f64() * 1000.0
    }

    fn time_decode(&self, chunks: &[SceneChunk], encoded: &[u8]) -> f64 {
        let mut targets: Vec<LiquidLayerStack> = chunks
            .iter()
            .map(|c| LiquidLayerStack::from_config(c.stack.origin(), &self.config))
            .collect();
        let start = Instant::now();
        decode_all(&mut targets, encoded, &self.catalog);
        start.elapsed().as_secs_f64() * 1000.0
    }

    fn time_legacy(&self, chunks: &[SceneChunk]) -> f64 {
        let mut stacks: Vec<LiquidLayerStack> = chunks.iter().map(|c| c.stack.clone()).collect();
        let start = Instant::now();
        for stack in &mut stacks {
            let mut writer = ByteWriter::new();
            let mut flags = 0u32;
            let records = stack.encode_legacy(&mut writer, &mut flags);
            let bytes = writer.into_inner();
            let _ = stack.decode_legacy(
                &mut ByteReader::new(&bytes),
                records,
                &self.catalog,
                &self.config,
            );
        }
        start.elapsed().as_secs_f64() * 1000.0
    }
}

fn time(f: impl FnOnce() -> usize) -> f64 {
    let start = Instant::now();
    std::hint::black_box(f());
    start.elapsed().as_secs_f64() * 1000.0
}

/// Encode every chunk back to back, each prefixed with its byte length.
fn encode_all(chunks: &[SceneChunk]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    for chunk in chunks {
        let mut stack = chunk.stack.clone();
        let base = writer.len();
        let length_pos = writer.reserve_zeroed(4);
        let header_pos = writer.len();
        if let Err(e) = stack.encode(&mut writer, base, header_pos) {
            log::error!("Encode failed: {e}");
            break;
        }
        let length = (writer.len() - base) as u32;
        writer.patch(length_pos, &length.to_le_bytes());
    }
    writer.into_inner()
}

/// Decode records written by [`encode_all`] into `targets`, in order.
/// Returns the number of chunks decoded.
fn decode_all(targets: &mut [LiquidLayerStack], encoded: &[u8], catalog: &LiquidTypeCatalog) -> usize {
    let mut pos = 0;
    let mut decoded = 0;
    for target in targets {
        let Ok(mut reader) = ByteReader::at(encoded, pos) else {
            break;
        };
        let Ok(length) = reader.read_u32() else {
            break;
        };
        if let Err(e) = target.decode(&mut reader, pos, catalog) {
            log::error!("Decode failed at byte {pos}: {e}");
            break;
        }
        pos += length as usize;
        decoded += 1;
    }
    decoded
}

/// Compute timing statistics from a list of frame times in milliseconds.
fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
