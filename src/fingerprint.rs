use xxhash_rust::xxh3::Xxh3;

use crate::pipeline::SeparationOutput;

const XXH3_SEED: u64 = 0x5eed_d1f0_57ac_4b21;

/// Stable 128-bit digest of a separation run: thresholds are implied by the
/// layer depth ranges, so hashing layers, composite and manifest metadata is
/// enough to witness bit-identical reproduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeparationFingerprint {
    pub hi: u64,
    pub lo: u64,
}

pub fn fingerprint_output(output: &SeparationOutput) -> SeparationFingerprint {
    let mut h = StableHasher::new();

    h.write_u32(output.composite.width);
    h.write_u32(output.composite.height);
    h.write_bytes(&output.composite.data);

    h.write_u32(output.layers.len() as u32);
    for layer in &output.layers {
        h.write_u32(layer.order);
        h.write_u8(layer.depth_range.0);
        h.write_u8(layer.depth_range.1);
        h.write_f64(layer.coverage_percent);
        h.write_bool(layer.is_opaque);
        h.write_u32(layer.pixels.width);
        h.write_u32(layer.pixels.height);
        h.write_bytes(&layer.pixels.data);
    }

    match &output.manifest {
        Some(manifest) => {
            h.write_u8(1);
            h.write_str(&manifest.job_id);
            h.write_u32(manifest.layer_count);
            h.write_u32(manifest.layers.len() as u32);
            for record in &manifest.layers {
                h.write_str(&record.name);
                h.write_u32(record.order);
                h.write_u8(record.depth_range.0);
                h.write_u8(record.depth_range.1);
                h.write_str(&record.description);
                h.write_f64(record.coverage_percent);
                h.write_bool(record.is_opaque);
            }
        }
        None => h.write_u8(0),
    }

    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> SeparationFingerprint {
        let v = self.inner.digest128();
        SeparationFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}
