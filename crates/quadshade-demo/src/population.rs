use quadshade_engine::shader::layout::POPULATION_CAPACITY;
use quadshade_engine::shader::AgentRecord;

/// 137.5 degrees.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Radius of the disc the agents are spread over, in world units.
const SPREAD: f32 = 320.0;

/// Lays `count` agents out on a golden-angle spiral, center outwards.
///
/// Records are `[x, y, radius, hue]`. The layout is deterministic and capped
/// at the population buffer capacity.
pub fn spiral(count: usize) -> Vec<AgentRecord> {
    let count = count.min(POPULATION_CAPACITY);
    if count == 0 {
        return Vec::new();
    }

    let n = count as f32;
    (0..count)
        .map(|i| {
            let t = i as f32;
            let r = SPREAD * ((t + 0.5) / n).sqrt();
            let a = t * GOLDEN_ANGLE;
            let radius = 6.0 + 6.0 * (1.0 - t / n);
            [r * a.cos(), r * a.sin(), radius, t / n]
        })
        .collect()
}
